//! TCP-backed tunnel transport.
//!
//! The broker's only I/O need is allocating fresh listening endpoints on
//! the bouncer's address. Binds are expected to fail fast; the OS picks an
//! ephemeral port. Accepting and splicing the tunneled connections belongs
//! to the transport collaborator, not the relay core.

use crate::broker::{EndpointGuard, ListenerHandle, TunnelTransport};
use crate::error::BrokerError;
use std::net::{IpAddr, TcpListener};
use tracing::debug;

/// Allocates broker endpoints by binding ephemeral TCP listeners.
pub struct TcpTunnelTransport {
    bind_address: IpAddr,
}

impl TcpTunnelTransport {
    /// Create a transport binding on the given local address.
    pub fn new(bind_address: IpAddr) -> Self {
        Self { bind_address }
    }
}

struct TcpEndpoint {
    _listener: TcpListener,
}

impl EndpointGuard for TcpEndpoint {}

impl TunnelTransport for TcpTunnelTransport {
    fn listen(&self) -> Result<(u16, ListenerHandle), BrokerError> {
        let listener = TcpListener::bind((self.bind_address, 0))?;
        let port = listener.local_addr()?.port();
        debug!(address = %self.bind_address, port, "allocated broker endpoint");
        Ok((port, Box::new(TcpEndpoint { _listener: listener })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn listen_allocates_distinct_ephemeral_ports() {
        let transport = TcpTunnelTransport::new(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let (port_a, _guard_a) = transport.listen().unwrap();
        let (port_b, _guard_b) = transport.listen().unwrap();
        assert_ne!(port_a, 0);
        assert_ne!(port_b, 0);
        assert_ne!(port_a, port_b);
    }

    #[test]
    fn dropping_the_guard_releases_the_port() {
        let transport = TcpTunnelTransport::new(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let (port, guard) = transport.listen().unwrap();
        drop(guard);
        // The port is free again; rebinding it succeeds.
        TcpListener::bind((Ipv4Addr::LOCALHOST, port)).unwrap();
    }
}
