//! Public sender type exported by the crate.

use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, warn};
use parking_lot::Mutex;

use crate::{
    error::SenderError, gelf_sender::GelfSender, message::GelfMessage, record::GelfRecord,
};

use super::{
    buffer::Admission,
    config::GelfSenderConfig,
    hosts::{HostSet, Resolve, SystemResolver},
    stats::SenderStats,
    transport::{Connect, Connection},
    worker::{Shared, Worker, WorkerState},
};

/// Sender forwarding records to a GELF collector over one TCP stream.
///
/// `send_message` never blocks on I/O; records wait in a bounded priority
/// buffer until the background worker writes them. Under overload the least
/// important records are evicted. Delivery is best effort: records that fail
/// twice, or that are still buffered at `close`, are lost.
pub struct GelfTcpSender<T: GelfRecord = GelfMessage> {
    shared: Arc<Shared<T>>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    done_rx: Receiver<()>,
    close_timeout: Duration,
}

impl<T: GelfRecord> GelfTcpSender<T> {
    /// Resolve `host`, connect to its first address, and start the worker.
    pub fn new(host: &str, port: u16) -> Result<Self, SenderError> {
        Self::with_config(GelfSenderConfig::new(host, port))
    }

    /// Construct the sender from a configuration object.
    pub fn with_config(config: GelfSenderConfig) -> Result<Self, SenderError> {
        let connector = config.connector();
        Self::with_transport(config, SystemResolver, connector)
    }

    /// Construct the sender with a custom resolver and connector.
    ///
    /// Resolution and the first connection happen synchronously; either
    /// failing aborts construction.
    pub fn with_transport<R, C>(
        config: GelfSenderConfig,
        resolver: R,
        connector: C,
    ) -> Result<Self, SenderError>
    where
        R: Resolve + 'static,
        C: Connect + 'static,
    {
        let mut hosts = HostSet::resolve(&resolver, &config.host, config.port, Instant::now())?;
        let connection = Connection::open(&connector, hosts.next())?;
        debug!(
            "GelfTcpSender connected to {} for {}:{}",
            connection.peer(),
            config.host,
            config.port
        );

        let shared = Arc::new(Shared::new(&config));
        let worker = Worker::new(
            Arc::clone(&shared),
            resolver,
            connector,
            hosts,
            connection,
            &config,
        );
        let (done_rx, handle) = worker.spawn();
        Ok(Self {
            shared,
            handle: Mutex::new(Some(handle)),
            done_rx,
            close_timeout: config.close_timeout,
        })
    }

    /// Queue `record` for delivery without blocking.
    ///
    /// Returns `false` when the record was rejected outright: the buffer is
    /// full of records at least as important, or the sender is closed.
    /// `true` may still mean an older, less important record was evicted.
    pub fn send_message(&self, record: T) -> bool {
        let counters = &self.shared.counters;
        match self.shared.buffer.offer(record) {
            Admission::Accepted => counters.record_accepted(),
            Admission::Displaced => {
                counters.record_accepted();
                counters.record_evicted();
            }
            Admission::Rejected => {
                counters.record_rejected();
                return false;
            }
        }
        true
    }

    /// Stop the worker and close the connection. Buffered records are
    /// discarded. Safe to call repeatedly and from any thread; every caller
    /// waits up to the close timeout for the worker to stop.
    pub fn close(&self) {
        let discarded = self.shared.buffer.close();
        if discarded > 0 {
            debug!("GelfTcpSender discarded {discarded} buffered records on close");
        }
        let handle = self.handle.lock().take();
        let stopped = self.wait_for_worker();
        let Some(handle) = handle else {
            return;
        };
        if stopped {
            if handle.join().is_err() {
                warn!("GelfTcpSender: worker thread panicked");
            }
        } else {
            // The worker is stuck in a blocking connect or write; it exits
            // on its own once the call returns.
            warn!(
                "GelfTcpSender: worker did not stop within {:?}; detaching",
                self.close_timeout
            );
        }
    }

    /// Wait for the worker's exit signal. The channel disconnects once the
    /// worker thread has finished, so late callers return immediately.
    fn wait_for_worker(&self) -> bool {
        match self.done_rx.recv_timeout(self.close_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        }
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.buffer.is_closed()
    }

    /// Number of records waiting in the buffer.
    pub fn pending(&self) -> usize {
        self.shared.buffer.len()
    }

    /// Snapshot of the delivery counters.
    pub fn stats(&self) -> SenderStats {
        self.shared.counters.snapshot()
    }

    /// Current phase of the delivery worker.
    pub fn worker_state(&self) -> WorkerState {
        self.shared.state()
    }

    /// Failure diagnostics the sender may still emit.
    pub fn error_budget_remaining(&self) -> u32 {
        self.shared.budget.remaining()
    }
}

impl<T: GelfRecord> GelfSender for GelfTcpSender<T> {
    type Record = T;

    fn send_message(&self, record: T) -> bool {
        GelfTcpSender::send_message(self, record)
    }

    fn close(&self) {
        GelfTcpSender::close(self);
    }
}

impl<T: GelfRecord> Drop for GelfTcpSender<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T: GelfRecord> std::fmt::Debug for GelfTcpSender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GelfTcpSender")
            .field("pending", &self.pending())
            .field("state", &self.worker_state())
            .field("close_timeout", &self.close_timeout)
            .finish()
    }
}
