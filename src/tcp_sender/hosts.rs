//! Host resolution and round-robin address selection.

use std::{
    io,
    net::{SocketAddr, ToSocketAddrs},
    time::{Duration, Instant},
};

use crate::error::SenderError;

/// How long a resolved address list is reused before it is refreshed.
pub const DEFAULT_DNS_TTL: Duration = Duration::from_secs(60);

/// Resolves a collector hostname to an ordered address list.
pub trait Resolve: Send {
    fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>>;
}

/// Resolver backed by the platform's `getaddrinfo`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
        (host, port).to_socket_addrs().map(Iterator::collect)
    }
}

/// Resolved addresses for one collector plus a round-robin cursor.
///
/// Only the delivery worker owns a `HostSet`, so it needs no locking.
#[derive(Debug)]
pub struct HostSet {
    host: String,
    port: u16,
    addrs: Vec<SocketAddr>,
    cursor: usize,
    resolved_at: Instant,
}

fn lookup<R: Resolve + ?Sized>(
    resolver: &R,
    host: &str,
    port: u16,
) -> Result<Vec<SocketAddr>, SenderError> {
    let addrs = resolver
        .resolve(host, port)
        .map_err(|source| SenderError::Resolution {
            host: host.to_owned(),
            port,
            source,
        })?;
    if addrs.is_empty() {
        return Err(SenderError::NoAddresses {
            host: host.to_owned(),
            port,
        });
    }
    Ok(addrs)
}

impl HostSet {
    /// Perform the initial resolution of `host:port`.
    pub fn resolve<R: Resolve + ?Sized>(
        resolver: &R,
        host: &str,
        port: u16,
        now: Instant,
    ) -> Result<Self, SenderError> {
        let addrs = lookup(resolver, host, port)?;
        Ok(Self {
            host: host.to_owned(),
            port,
            addrs,
            cursor: 0,
            resolved_at: now,
        })
    }

    /// Re-resolve in place and reset the cursor.
    ///
    /// On failure the previous addresses and timestamp are kept, so the next
    /// attempt retries the lookup.
    pub fn refresh<R: Resolve + ?Sized>(
        &mut self,
        resolver: &R,
        now: Instant,
    ) -> Result<(), SenderError> {
        self.addrs = lookup(resolver, &self.host, self.port)?;
        self.cursor = 0;
        self.resolved_at = now;
        Ok(())
    }

    /// Whether more than `ttl` has elapsed since the last resolution.
    pub fn is_stale(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.resolved_at) > ttl
    }

    /// Return the address under the cursor and advance it, wrapping at the end.
    pub fn next(&mut self) -> SocketAddr {
        let addr = self.addrs[self.cursor % self.addrs.len()];
        self.cursor = (self.cursor + 1) % self.addrs.len();
        addr
    }

    pub fn addresses(&self) -> &[SocketAddr] {
        &self.addrs
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}
