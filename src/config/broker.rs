//! DCC tunnel broker configuration.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};

/// Configuration for the direct-connection tunnel broker.
///
/// The broker rewrites DCC CHAT/SEND requests so both peers connect to the
/// bouncer instead of each other. `bind_address` is where new listening
/// endpoints are allocated; `advertise_address` is the IPv4 address written
/// into rewritten control messages (the address clients are told to dial).
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    /// Enable DCC bouncing. When disabled, DCC payloads pass through
    /// untouched like any other CTCP message.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Local address new broker endpoints bind to.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// IPv4 address advertised in rewritten control messages.
    #[serde(default = "default_advertise_address")]
    pub advertise_address: Ipv4Addr,

    /// Reject control messages with non-numeric address/port/size fields
    /// instead of degrading them to zero.
    #[serde(default)]
    pub strict_numerics: bool,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: default_bind_address(),
            advertise_address: default_advertise_address(),
            strict_numerics: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_advertise_address() -> Ipv4Addr {
    Ipv4Addr::LOCALHOST
}
