//! Builder for [`GelfTcpSender`](crate::GelfTcpSender).
//!
//! Exposes the collector address, buffer capacity, worker polling, DNS
//! refresh interval, diagnostic budget, and socket timeouts. Builders can also
//! be deserialised from JSON so the same settings can live in a config file.

use std::time::Duration;

use serde::Deserialize;

use crate::{
    error::SenderBuildError,
    record::GelfRecord,
    tcp_sender::{GelfSenderConfig, GelfTcpSender},
};

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(SenderBuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`GelfTcpSender`] instances.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GelfSenderBuilder {
    host: Option<String>,
    port: Option<u16>,
    capacity: Option<usize>,
    poll_interval_ms: Option<u64>,
    dns_ttl_secs: Option<u64>,
    error_budget: Option<u32>,
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
    close_timeout_ms: Option<u64>,
}

impl GelfSenderBuilder {
    /// Create a new builder with no collector configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse builder settings from a JSON object.
    pub fn from_json(text: &str) -> Result<Self, SenderBuildError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Target the collector at `host:port`.
    pub fn with_tcp(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = Some(host.into());
        self.port = Some(port);
        self
    }

    option_setter!(
        #[doc = "Set the outbound buffer capacity."]
        with_capacity,
        capacity,
        usize
    );
    option_setter!(with_poll_interval_ms, poll_interval_ms, u64);
    option_setter!(with_dns_ttl_secs, dns_ttl_secs, u64);
    option_setter!(
        #[doc = "Set how many failure diagnostics may be logged. Zero silences them."]
        with_error_budget,
        error_budget,
        u32
    );
    option_setter!(with_connect_timeout_ms, connect_timeout_ms, u64);
    option_setter!(with_write_timeout_ms, write_timeout_ms, u64);
    option_setter!(with_close_timeout_ms, close_timeout_ms, u64);

    fn validate(&self) -> Result<(), SenderBuildError> {
        self.validate_target()?;
        if let Some(capacity) = self.capacity {
            ensure_positive!(capacity, "capacity")?;
        }
        self.validate_timeouts()
    }

    fn validate_target(&self) -> Result<(), SenderBuildError> {
        match self.host.as_deref() {
            None => Err(SenderBuildError::InvalidConfig(
                "sender requires a collector host".into(),
            )),
            Some(host) if host.trim().is_empty() => Err(SenderBuildError::InvalidConfig(
                "tcp host must not be empty".into(),
            )),
            _ => {
                if let Some(port) = self.port {
                    ensure_positive!(port, "port")?;
                }
                Ok(())
            }
        }
    }

    fn validate_timeouts(&self) -> Result<(), SenderBuildError> {
        let timeouts = [
            (self.poll_interval_ms, "poll_interval_ms"),
            (self.dns_ttl_secs, "dns_ttl_secs"),
            (self.connect_timeout_ms, "connect_timeout_ms"),
            (self.write_timeout_ms, "write_timeout_ms"),
            (self.close_timeout_ms, "close_timeout_ms"),
        ];
        for (value, field) in timeouts {
            if let Some(value) = value {
                ensure_positive!(value, field)?;
            }
        }
        Ok(())
    }

    /// Validate the settings and produce a configuration.
    pub fn build_config(&self) -> Result<GelfSenderConfig, SenderBuildError> {
        self.validate()?;
        let mut config = GelfSenderConfig::default();
        if let Some(host) = &self.host {
            config.host = host.trim().to_owned();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = self.dns_ttl_secs {
            config.dns_ttl = Duration::from_secs(secs);
        }
        if let Some(budget) = self.error_budget {
            config.error_budget = budget;
        }
        config.connect_timeout = self.connect_timeout_ms.map(Duration::from_millis);
        config.write_timeout = self.write_timeout_ms.map(Duration::from_millis);
        if let Some(ms) = self.close_timeout_ms {
            config.close_timeout = Duration::from_millis(ms);
        }
        Ok(config)
    }

    /// Build a sender, resolving and connecting synchronously.
    pub fn build<T: GelfRecord>(&self) -> Result<GelfTcpSender<T>, SenderBuildError> {
        let config = self.build_config()?;
        Ok(GelfTcpSender::with_config(config)?)
    }
}
