//! Delivery counters exposed for diagnostics and tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of a sender's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SenderStats {
    /// Records stored by `send_message`.
    pub accepted: u64,
    /// Older records evicted to admit a more important one.
    pub evicted: u64,
    /// Records refused by `send_message`.
    pub rejected: u64,
    /// Records written to the collector.
    pub delivered: u64,
    /// Records the worker gave up on.
    pub dropped: u64,
    /// Connections opened by the worker after the initial one.
    pub reconnects: u64,
    /// DNS refreshes performed by the worker.
    pub refreshes: u64,
}

#[derive(Debug, Default)]
pub(crate) struct SenderCounters {
    accepted: AtomicU64,
    evicted: AtomicU64,
    rejected: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    reconnects: AtomicU64,
    refreshes: AtomicU64,
}

macro_rules! counter_incr {
    ($($name:ident => $field:ident),* $(,)?) => {
        $(
            pub(crate) fn $name(&self) {
                self.$field.fetch_add(1, Ordering::Relaxed);
            }
        )*
    };
}

impl SenderCounters {
    counter_incr!(
        record_accepted => accepted,
        record_evicted => evicted,
        record_rejected => rejected,
        record_delivered => delivered,
        record_dropped => dropped,
        record_reconnect => reconnects,
        record_refresh => refreshes,
    );

    pub(crate) fn snapshot(&self) -> SenderStats {
        SenderStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
        }
    }
}
