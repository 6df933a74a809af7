//! Bounded priority buffer shared between producers and the delivery worker.
//!
//! Records are keyed by `(priority, sequence)`. The sequence number is a
//! monotonically increasing insertion counter, so equal priorities drain in
//! insertion order and distinct records never share a key. When an insert
//! pushes the buffer past capacity, the greatest key is evicted: the least
//! important record, and among equals the most recently inserted.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

use crate::record::GelfRecord;

/// Default number of records held before eviction starts.
pub const DEFAULT_BUFFER_CAPACITY: usize = 512;

/// Outcome of offering a record to the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Stored without displacing anything.
    Accepted,
    /// Stored; an older, less important record was evicted to make room.
    Displaced,
    /// Not stored: the buffer was full of records at least as important, or
    /// the buffer has been closed.
    Rejected,
}

impl Admission {
    /// Whether the record now sits in the buffer.
    pub fn is_accepted(self) -> bool {
        !matches!(self, Admission::Rejected)
    }
}

struct Inner<T> {
    entries: BTreeMap<(u32, u64), T>,
    next_seq: u64,
}

pub struct OutboundBuffer<T> {
    inner: Mutex<Inner<T>>,
    available: Condvar,
    capacity: usize,
    closed: AtomicBool,
}

impl<T: GelfRecord> OutboundBuffer<T> {
    /// Create an empty buffer holding at most `capacity` records.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: BTreeMap::new(),
                next_seq: 0,
            }),
            available: Condvar::new(),
            capacity: capacity.max(1),
            closed: AtomicBool::new(false),
        }
    }

    /// Insert `record`, evicting the lowest-priority record on overflow.
    ///
    /// Returns `false` only when the evicted record is `record` itself.
    pub fn enqueue(&self, record: T) -> bool {
        self.offer(record).is_accepted()
    }

    /// Insert `record` and report exactly what happened.
    pub fn offer(&self, record: T) -> Admission {
        let mut inner = self.inner.lock();
        if self.is_closed() {
            return Admission::Rejected;
        }
        let key = (record.priority(), inner.next_seq);
        inner.next_seq += 1;
        inner.entries.insert(key, record);

        let admission = if inner.entries.len() > self.capacity {
            match inner.entries.pop_last() {
                Some((evicted, _)) if evicted == key => Admission::Rejected,
                _ => Admission::Displaced,
            }
        } else {
            Admission::Accepted
        };
        drop(inner);

        if admission.is_accepted() {
            self.available.notify_one();
        }
        admission
    }

    /// Pop the highest-priority record, waiting up to `timeout` for one.
    ///
    /// Returns `None` on timeout or as soon as the buffer is closed.
    pub fn drain(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        loop {
            if self.is_closed() {
                return None;
            }
            if let Some((_, record)) = inner.entries.pop_first() {
                return Some(record);
            }
            if self.available.wait_until(&mut inner, deadline).timed_out() {
                if self.is_closed() {
                    return None;
                }
                return inner.entries.pop_first().map(|(_, record)| record);
            }
        }
    }

    /// Close the buffer, discard its contents, and wake the consumer.
    ///
    /// Returns how many records were discarded. Closing twice discards
    /// nothing the second time.
    pub fn close(&self) -> usize {
        let mut inner = self.inner.lock();
        self.closed.store(true, Ordering::Release);
        let discarded = inner.entries.len();
        inner.entries.clear();
        drop(inner);
        self.available.notify_all();
        discarded
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
