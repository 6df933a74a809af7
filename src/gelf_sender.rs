use crate::record::GelfRecord;

/// Trait implemented by all GELF senders.
///
/// `GelfSender` is `Send + Sync` so a single sender can be shared between
/// producer threads. Implementations must hand the record off without
/// blocking the caller.
pub trait GelfSender: Send + Sync {
    type Record: GelfRecord;

    /// Queue a record for delivery. Returns `false` if it was rejected.
    fn send_message(&self, record: Self::Record) -> bool;

    /// Stop delivering. Idempotent.
    fn close(&self);
}
