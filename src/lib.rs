//! tetherd - Tether IRC Bouncer
//!
//! The capability-aware message-relay core: identify-msg envelope handling,
//! per-client fan-out, detach-time buffering, and the DCC tunnel broker.

pub mod broker;
pub mod caps;
pub mod config;
pub mod error;
pub mod network;
pub mod relay;
pub mod state;

pub use config::Config;
pub use error::BrokerError;
pub use relay::RelayCore;
