//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`relay`]: Relay and backlog formatting configuration (RelayConfig)
//! - [`broker`]: DCC tunnel broker configuration (BrokerConfig)

mod broker;
mod relay;

pub use broker::BrokerConfig;
pub use relay::RelayConfig;

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML or is missing required fields.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bouncer identity.
    pub server: ServerConfig,
    /// Relay and backlog settings.
    #[serde(default)]
    pub relay: RelayConfig,
    /// Tunnel broker settings.
    #[serde(default)]
    pub broker: BrokerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Bouncer identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bouncer name (e.g., "bnc.example.net").
    pub name: String,
}
