//! Integration test common infrastructure.
//!
//! Provides mock tunnel transports and user/client builders for driving
//! the relay core without real sockets.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use tetherd::broker::{EndpointGuard, ListenerHandle, SessionRegistry, TunnelTransport};
use tetherd::config::{BrokerConfig, Config, RelayConfig, ServerConfig};
use tetherd::error::BrokerError;
use tetherd::relay::RelayCore;
use tetherd::state::{Client, User};
use tokio::sync::mpsc;

struct NullGuard;
impl EndpointGuard for NullGuard {}

/// Hands out sequential "allocated" ports without touching the network.
pub struct SequentialPorts {
    next: AtomicU16,
}

impl SequentialPorts {
    pub fn starting_at(port: u16) -> Self {
        Self {
            next: AtomicU16::new(port),
        }
    }
}

impl TunnelTransport for SequentialPorts {
    fn listen(&self) -> Result<(u16, ListenerHandle), BrokerError> {
        let port = self.next.fetch_add(1, Ordering::SeqCst);
        Ok((port, Box::new(NullGuard)))
    }
}

/// Always fails allocation, for exercising the silent-drop path.
pub struct FailingTransport;

impl TunnelTransport for FailingTransport {
    fn listen(&self) -> Result<(u16, ListenerHandle), BrokerError> {
        Err(BrokerError::Allocation(std::io::Error::other(
            "address in use",
        )))
    }
}

/// Timestamp-free relay config so buffered lines are deterministic.
pub fn plain_relay_config() -> RelayConfig {
    RelayConfig {
        timestamp_format: String::new(),
        prepend_timestamps: false,
        append_timestamps: false,
    }
}

pub fn test_config(strict_numerics: bool) -> Config {
    Config {
        server: ServerConfig {
            name: "bnc.test".to_string(),
        },
        relay: plain_relay_config(),
        broker: BrokerConfig {
            strict_numerics,
            ..BrokerConfig::default()
        },
    }
}

pub fn relay_core(
    strict_numerics: bool,
    registry: Arc<SessionRegistry>,
    transport: Arc<dyn TunnelTransport>,
) -> RelayCore {
    RelayCore::new(&test_config(strict_numerics), registry, transport)
}

pub fn test_user(name: &str) -> User {
    User::new(name, plain_relay_config())
}

/// Attach a client with the given capabilities, returning its delivery end.
pub fn attach_client(user: &mut User, caps: &[&str]) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let caps: HashSet<String> = caps.iter().map(|c| c.to_string()).collect();
    user.attach_client(Client::with_caps(tx, caps));
    rx
}

/// Drain everything currently queued for a client.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Ok(line) = rx.try_recv() {
        lines.push(line);
    }
    lines
}
