//! Test helpers shared by unit and integration tests.
//!
//! Compiled for unit tests and when the `test-util` feature is enabled. The
//! scripted resolver and connector let tests drive the delivery worker
//! through DNS, connect, and write failures without a network.

use std::{
    collections::VecDeque,
    io::{self, Write},
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

use crate::{
    error::SenderError,
    record::GelfRecord,
    tcp_sender::{Connect, Resolve, Stream},
};

/// Minimal record with an explicit priority and label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestRecord {
    pub priority: u32,
    pub label: String,
    pub valid: bool,
}

impl TestRecord {
    pub fn new(priority: u32, label: &str) -> Self {
        Self {
            priority,
            label: label.to_owned(),
            valid: true,
        }
    }

    pub fn invalid(priority: u32, label: &str) -> Self {
        Self {
            valid: false,
            ..Self::new(priority, label)
        }
    }
}

impl GelfRecord for TestRecord {
    fn priority(&self) -> u32 {
        self.priority
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn to_frame(&self) -> Result<Vec<u8>, SenderError> {
        let mut frame = self.label.clone().into_bytes();
        frame.push(0);
        Ok(frame)
    }
}

/// Resolver returning a fixed address list and counting lookups.
#[derive(Clone, Debug)]
pub struct StaticResolver {
    addrs: Arc<Mutex<Vec<SocketAddr>>>,
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl StaticResolver {
    /// # Panics
    ///
    /// Panics if an address does not parse.
    pub fn new<I, S>(addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let addrs = addrs
            .into_iter()
            .map(|a| a.as_ref().parse().expect("valid socket address"))
            .collect();
        Self {
            addrs: Arc::new(Mutex::new(addrs)),
            calls: Arc::new(AtomicUsize::new(0)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of lookups performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make subsequent lookups fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Resolve for StaticResolver {
    fn resolve(&self, _host: &str, _port: u16) -> io::Result<Vec<SocketAddr>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(io::Error::other("lookup failed"));
        }
        Ok(self.addrs.lock().clone())
    }
}

/// What a scripted stream does with the next write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Accept the whole frame.
    Accept,
    /// Fail with `BrokenPipe`.
    Fail,
    /// Accept all but the last byte.
    Short,
    /// Stall for the given duration, then accept the whole frame.
    Delay(Duration),
}

#[derive(Default)]
struct Script {
    writes: VecDeque<WriteOutcome>,
    connect_failures: usize,
    opened: Vec<SocketAddr>,
    frames: Vec<Vec<u8>>,
    write_attempts: usize,
    shutdowns: usize,
}

/// Connector whose streams follow a shared script.
///
/// Writes not covered by the script are accepted.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for the next writes across all streams.
    pub fn push_writes(&self, outcomes: impl IntoIterator<Item = WriteOutcome>) {
        self.script.lock().writes.extend(outcomes);
    }

    /// Make the next `count` connection attempts fail.
    pub fn fail_connects(&self, count: usize) {
        self.script.lock().connect_failures += count;
    }

    /// Addresses connected to, in order, including the initial connection.
    pub fn opened(&self) -> Vec<SocketAddr> {
        self.script.lock().opened.clone()
    }

    /// Frames successfully written, in order.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.script.lock().frames.clone()
    }

    /// Frames written, with the trailing NUL stripped and decoded as UTF-8.
    pub fn labels(&self) -> Vec<String> {
        self.frames()
            .into_iter()
            .map(|frame| {
                let body = frame.strip_suffix(&[0]).unwrap_or(&frame);
                String::from_utf8_lossy(body).into_owned()
            })
            .collect()
    }

    /// Every write call made, successful or not.
    pub fn write_attempts(&self) -> usize {
        self.script.lock().write_attempts
    }

    /// Streams shut down so far.
    pub fn shutdowns(&self) -> usize {
        self.script.lock().shutdowns
    }
}

impl Connect for ScriptedConnector {
    type Stream = ScriptedStream;

    fn open(&self, addr: SocketAddr) -> io::Result<ScriptedStream> {
        let mut script = self.script.lock();
        if script.connect_failures > 0 {
            script.connect_failures -= 1;
            return Err(io::ErrorKind::ConnectionRefused.into());
        }
        script.opened.push(addr);
        Ok(ScriptedStream {
            script: Arc::clone(&self.script),
        })
    }
}

pub struct ScriptedStream {
    script: Arc<Mutex<Script>>,
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let outcome = {
            let mut script = self.script.lock();
            script.write_attempts += 1;
            script.writes.pop_front().unwrap_or(WriteOutcome::Accept)
        };
        match outcome {
            WriteOutcome::Accept => {
                self.script.lock().frames.push(buf.to_vec());
                Ok(buf.len())
            }
            WriteOutcome::Delay(pause) => {
                thread::sleep(pause);
                self.script.lock().frames.push(buf.to_vec());
                Ok(buf.len())
            }
            WriteOutcome::Fail => Err(io::ErrorKind::BrokenPipe.into()),
            WriteOutcome::Short => Ok(buf.len().saturating_sub(1)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Stream for ScriptedStream {
    fn shutdown(&mut self) -> io::Result<()> {
        self.script.lock().shutdowns += 1;
        Ok(())
    }
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
