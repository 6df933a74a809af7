//! Non-blocking GELF delivery over TCP.
//!
//! Producers hand records to a [`GelfTcpSender`]; a background worker writes
//! them to the collector in priority order, reconnecting and re-resolving
//! the collector host as needed.

pub mod builder;
pub mod error;
pub mod error_budget;
pub mod framing;
mod gelf_sender;
pub mod level;
pub mod message;
mod record;
pub mod tcp_sender;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use builder::GelfSenderBuilder;
pub use error::{SenderBuildError, SenderError};
pub use error_budget::ErrorBudget;
pub use framing::FrameFormat;
pub use gelf_sender::GelfSender;
pub use level::GelfLevel;
pub use message::GelfMessage;
pub use record::GelfRecord;
pub use tcp_sender::{
    Admission, Connect, Connection, GelfSenderConfig, GelfTcpSender, HostSet, OutboundBuffer,
    Resolve, SenderStats, Stream, SystemResolver, TcpConnector, WorkerState,
};
