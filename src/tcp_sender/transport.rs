//! Transport primitives for the TCP sender.

use std::{
    io::{self, Write},
    net::{Shutdown, SocketAddr, TcpStream},
    time::Duration,
};

use crate::error::SenderError;

/// A writable byte stream the worker can deliver frames over.
pub trait Stream: Write + Send {
    /// Best-effort check that the peer is still attached.
    fn is_connected(&self) -> bool {
        true
    }

    /// Shut the stream down. Errors are reported but callers ignore them.
    fn shutdown(&mut self) -> io::Result<()>;
}

impl Stream for TcpStream {
    fn is_connected(&self) -> bool {
        self.peer_addr().is_ok()
    }

    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Opens a stream to exactly one address. Never retries across addresses.
pub trait Connect: Send {
    type Stream: Stream + 'static;

    fn open(&self, addr: SocketAddr) -> io::Result<Self::Stream>;
}

/// Plain TCP connector with optional timeouts.
///
/// With no timeouts configured, connect and write block for as long as the
/// operating system allows.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpConnector {
    pub connect_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
}

impl Connect for TcpConnector {
    type Stream = TcpStream;

    fn open(&self, addr: SocketAddr) -> io::Result<TcpStream> {
        let stream = match self.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };
        stream.set_write_timeout(self.write_timeout)?;
        Ok(stream)
    }
}

/// A single live stream to one resolved address.
pub struct Connection<S: Stream> {
    stream: Option<S>,
    peer: SocketAddr,
}

impl<S: Stream> Connection<S> {
    /// Open a connection to `addr` using `connector`.
    pub fn open<C>(connector: &C, addr: SocketAddr) -> Result<Self, SenderError>
    where
        C: Connect<Stream = S> + ?Sized,
    {
        let stream = connector
            .open(addr)
            .map_err(|source| SenderError::Connect { addr, source })?;
        Ok(Self {
            stream: Some(stream),
            peer: addr,
        })
    }

    /// Write the whole frame in one call.
    ///
    /// A write that accepts fewer bytes than `frame.len()` fails the send;
    /// the remainder is not resumed.
    pub fn send_exact(&mut self, frame: &[u8]) -> Result<(), SenderError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| SenderError::Transport(io::ErrorKind::NotConnected.into()))?;
        let written = stream.write(frame).map_err(SenderError::Transport)?;
        if written != frame.len() {
            return Err(SenderError::ShortWrite {
                expected: frame.len(),
                written,
            });
        }
        stream.flush().map_err(SenderError::Transport)
    }

    pub fn is_connected(&self) -> bool {
        self.stream.as_ref().is_some_and(Stream::is_connected)
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Close the stream, ignoring errors. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown();
        }
    }
}

impl<S: Stream> Drop for Connection<S> {
    fn drop(&mut self) {
        self.close();
    }
}
