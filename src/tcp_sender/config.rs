//! Configuration consumed by the TCP sender lifecycle.
//!
//! [`GelfSenderBuilder`](crate::GelfSenderBuilder) validates user input before
//! producing these values.

use std::time::Duration;

use crate::error_budget::DEFAULT_ERROR_BUDGET;

use super::{
    buffer::DEFAULT_BUFFER_CAPACITY, hosts::DEFAULT_DNS_TTL, transport::TcpConnector,
};

/// Default GELF TCP port.
pub const DEFAULT_PORT: u16 = 12201;
/// How long the worker waits for a record before re-checking for shutdown.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// How long `close` waits for the worker to exit before detaching it.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
pub struct GelfSenderConfig {
    pub host: String,
    pub port: u16,
    pub capacity: usize,
    pub poll_interval: Duration,
    pub dns_ttl: Duration,
    pub error_budget: u32,
    pub connect_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
    pub close_timeout: Duration,
}

impl Default for GelfSenderConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: DEFAULT_PORT,
            capacity: DEFAULT_BUFFER_CAPACITY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            dns_ttl: DEFAULT_DNS_TTL,
            error_budget: DEFAULT_ERROR_BUDGET,
            connect_timeout: None,
            write_timeout: None,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }
}

impl GelfSenderConfig {
    /// Default configuration targeting `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Connector honouring the configured timeouts.
    pub fn connector(&self) -> TcpConnector {
        TcpConnector {
            connect_timeout: self.connect_timeout,
            write_timeout: self.write_timeout,
        }
    }
}
