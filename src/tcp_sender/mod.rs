//! TCP delivery of GELF records.
//!
//! This module defines `GelfTcpSender`, which accepts records from any number
//! of producer threads into a bounded priority buffer and forwards them to a
//! collector from a single background worker. The worker owns the resolved
//! address list and the TCP stream, refreshes DNS when the list is older than
//! its time-to-live, rotates through addresses on reconnect, and retries a
//! failed record exactly once before dropping it.

mod buffer;
mod config;
mod hosts;
mod sender;
mod stats;
mod transport;
mod worker;


pub use buffer::{Admission, DEFAULT_BUFFER_CAPACITY, OutboundBuffer};
pub use config::{DEFAULT_CLOSE_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_PORT, GelfSenderConfig};
pub use hosts::{DEFAULT_DNS_TTL, HostSet, Resolve, SystemResolver};
pub use sender::GelfTcpSender;
pub use stats::SenderStats;
pub use transport::{Connect, Connection, Stream, TcpConnector};
pub use worker::WorkerState;
