//! A minimal GELF TCP collector that reports each NUL-delimited frame.

use std::{
    io::{BufRead, BufReader},
    net::{SocketAddr, TcpListener},
    sync::mpsc,
    thread,
    time::Duration,
};

use serde_json::Value;

/// Handle to a collector thread serving a single connection.
pub struct Collector {
    pub addr: SocketAddr,
    frames: mpsc::Receiver<Vec<u8>>,
}

impl Collector {
    /// Wait for the next frame and decode it as GELF JSON.
    pub fn recv_json(&self, expectation: &str) -> Value {
        let payload = self
            .frames
            .recv_timeout(Duration::from_secs(5))
            .expect(expectation);
        serde_json::from_slice(&payload).expect("decode payload")
    }
}

/// Bind an ephemeral listener and forward every frame from its first
/// connection.
pub fn spawn_collector() -> Collector {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
    let addr = listener.local_addr().expect("listener has address");
    let (tx, frames) = mpsc::channel();
    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept connection");
        let mut reader = BufReader::new(stream);
        loop {
            let mut frame = Vec::new();
            match reader.read_until(0, &mut frame) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if frame.last() == Some(&0) {
                        frame.pop();
                    }
                    if tx.send(frame).is_err() {
                        break;
                    }
                }
            }
        }
    });
    Collector { addr, frames }
}
