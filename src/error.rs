//! Error taxonomy for the sender.
//!
//! Runtime failures (`Resolution`, `Connect`, `Transport`, `ShortWrite`) are
//! consumed by the delivery worker's retry policy and only reach callers
//! during construction. Buffer pressure is never an error; it surfaces through
//! the boolean returned by [`GelfSender::send_message`](crate::GelfSender).

use std::{io, net::SocketAddr};

use thiserror::Error;

/// Errors raised while resolving, connecting, encoding, or writing records.
#[derive(Debug, Error)]
pub enum SenderError {
    /// DNS lookup for the collector host failed.
    #[error("failed to resolve {host}:{port}: {source}")]
    Resolution {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    /// DNS lookup succeeded but returned no addresses.
    #[error("{host}:{port} resolved to no addresses")]
    NoAddresses { host: String, port: u16 },
    /// The TCP stream could not be established.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// Writing to an established stream failed.
    #[error("write failed: {0}")]
    Transport(#[source] io::Error),
    /// The stream accepted fewer bytes than the frame holds.
    #[error("short write, expected to write {expected}, wrote {written}")]
    ShortWrite { expected: usize, written: usize },
    /// The record failed its validity check.
    #[error("record failed validation")]
    Validation,
    /// The record could not be serialised.
    #[error("failed to encode record: {0}")]
    Encoding(#[from] serde_json::Error),
    /// The encoded record exceeds the frame size limit.
    #[error("frame of {size} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { size: usize, max: usize },
}

/// Errors that may occur while building a sender from a builder.
#[derive(Debug, Error)]
pub enum SenderBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid sender configuration: {0}")]
    InvalidConfig(String),
    /// Configuration text could not be parsed.
    #[error("failed to parse sender configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// Initial resolution or connection failed.
    #[error(transparent)]
    Sender(#[from] SenderError),
}
