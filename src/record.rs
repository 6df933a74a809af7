//! The narrow interface the sender requires from a log record.

use crate::error::SenderError;

/// A record the sender can buffer and deliver.
///
/// The sender never looks inside a record beyond these three methods.
/// Validity is checked when the worker picks the record up, not when it is
/// enqueued, so an invalid record still occupies buffer space until drained.
pub trait GelfRecord: Send + 'static {
    /// Ordering key. Lower values are delivered first and evicted last.
    fn priority(&self) -> u32;

    /// Whether the record may be written to the wire.
    fn is_valid(&self) -> bool;

    /// Produce the complete framed byte sequence for a single write.
    fn to_frame(&self) -> Result<Vec<u8>, SenderError>;
}
