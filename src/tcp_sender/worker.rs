//! Delivery worker driving DNS refresh, connection lifecycle, and retries.
//!
//! The worker is the only thread that touches the [`HostSet`] and the live
//! [`Connection`]. Each record gets one attempt plus exactly one retry; a
//! second failure drops it. Failure diagnostics are spent from the sender's
//! [`ErrorBudget`].

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, bounded};
use log::{debug, warn};

use crate::{error::SenderError, error_budget::ErrorBudget, record::GelfRecord};

use super::{
    buffer::OutboundBuffer,
    config::GelfSenderConfig,
    hosts::{HostSet, Resolve},
    stats::SenderCounters,
    transport::{Connect, Connection},
};

/// Observable phase of the delivery worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting on the buffer.
    Idle,
    /// Writing a record over the current connection.
    Sending,
    /// Opening a replacement connection.
    Reconnecting,
    /// Exited after shutdown.
    Stopped,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Sending,
            2 => Self::Reconnecting,
            _ => Self::Stopped,
        }
    }
}

/// State shared between the sender facade and its worker.
pub(crate) struct Shared<T> {
    pub(crate) buffer: OutboundBuffer<T>,
    pub(crate) budget: ErrorBudget,
    pub(crate) counters: SenderCounters,
    state: AtomicU8,
}

impl<T: GelfRecord> Shared<T> {
    pub(crate) fn new(config: &GelfSenderConfig) -> Self {
        Self {
            buffer: OutboundBuffer::new(config.capacity),
            budget: ErrorBudget::new(config.error_budget),
            counters: SenderCounters::default(),
            state: AtomicU8::new(WorkerState::Idle as u8),
        }
    }

    pub(crate) fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

pub(crate) struct Worker<T, R, C: Connect> {
    shared: Arc<Shared<T>>,
    resolver: R,
    connector: C,
    hosts: HostSet,
    connection: Option<Connection<C::Stream>>,
    poll_interval: Duration,
    dns_ttl: Duration,
}

impl<T, R, C> Worker<T, R, C>
where
    T: GelfRecord,
    R: Resolve + 'static,
    C: Connect + 'static,
{
    pub(crate) fn new(
        shared: Arc<Shared<T>>,
        resolver: R,
        connector: C,
        hosts: HostSet,
        connection: Connection<C::Stream>,
        config: &GelfSenderConfig,
    ) -> Self {
        Self {
            shared,
            resolver,
            connector,
            hosts,
            connection: Some(connection),
            poll_interval: config.poll_interval,
            dns_ttl: config.dns_ttl,
        }
    }

    /// Start the worker thread. The returned receiver fires once it exits.
    pub(crate) fn spawn(self) -> (Receiver<()>, thread::JoinHandle<()>) {
        let (done_tx, done_rx) = bounded(1);
        let handle = thread::spawn(move || {
            self.run();
            let _ = done_tx.send(());
        });
        (done_rx, handle)
    }

    fn run(mut self) {
        while !self.shared.buffer.is_closed() {
            self.shared.set_state(WorkerState::Idle);
            if let Some(record) = self.shared.buffer.drain(self.poll_interval) {
                self.deliver(record);
            }
        }
        self.discard_connection();
        self.shared.set_state(WorkerState::Stopped);
        debug!("GelfTcpSender worker stopped");
    }

    fn deliver(&mut self, record: T) {
        if self.shared.buffer.is_closed() {
            self.drop_record(|| {
                warn!(
                    "GelfTcpSender not sending record (priority {}) after shutdown",
                    record.priority()
                );
            });
            return;
        }
        if !record.is_valid() {
            self.drop_record(|| {
                warn!(
                    "GelfTcpSender not sending invalid record (priority {})",
                    record.priority()
                );
            });
            return;
        }
        let frame = match record.to_frame() {
            Ok(frame) => frame,
            Err(err) => {
                self.drop_record(|| warn!("GelfTcpSender could not encode record: {err}"));
                return;
            }
        };

        self.shared.set_state(WorkerState::Sending);
        if let Err(err) = self.attempt(&frame) {
            self.discard_connection();
            self.shared
                .budget
                .report(|| warn!("GelfTcpSender failed sending record, retrying once: {err}"));
            if let Err(err) = self.attempt(&frame) {
                self.discard_connection();
                self.drop_record(|| warn!("GelfTcpSender dropped record after retry: {err}"));
                return;
            }
        }
        self.shared.counters.record_delivered();
    }

    fn attempt(&mut self, frame: &[u8]) -> Result<(), SenderError> {
        let now = Instant::now();
        if self.hosts.is_stale(now, self.dns_ttl) {
            self.hosts.refresh(&self.resolver, now)?;
            self.shared.counters.record_refresh();
            debug!(
                "GelfTcpSender refreshed {}:{} to {} addresses",
                self.hosts.host(),
                self.hosts.port(),
                self.hosts.addresses().len()
            );
        }

        // A refreshed address list does not force a reconnect; the live
        // connection is kept until it fails.
        let connected = self
            .connection
            .as_ref()
            .is_some_and(|conn| conn.is_connected());
        if !connected {
            self.discard_connection();
            self.shared.set_state(WorkerState::Reconnecting);
            let addr = self.hosts.next();
            let connection = Connection::open(&self.connector, addr)?;
            self.shared.counters.record_reconnect();
            debug!("GelfTcpSender reconnected to {addr}");
            self.connection = Some(connection);
            self.shared.set_state(WorkerState::Sending);
        }

        match self.connection.as_mut() {
            Some(conn) => conn.send_exact(frame),
            None => Err(SenderError::Transport(io::ErrorKind::NotConnected.into())),
        }
    }

    fn discard_connection(&mut self) {
        if let Some(mut conn) = self.connection.take() {
            conn.close();
        }
    }

    fn drop_record(&self, report: impl FnOnce()) {
        self.shared.counters.record_dropped();
        self.shared.budget.report(report);
    }
}
