//! tetherd - Tether IRC Bouncer
//!
//! Binary bootstrap: load configuration, wire the relay core to the shared
//! session registry and tunnel transport, then wait for shutdown. The
//! connection plumbing (upstream sockets, client listeners) attaches to the
//! core through the library API.

use std::sync::Arc;
use tetherd::broker::SessionRegistry;
use tetherd::config::Config;
use tetherd::network::TcpTunnelTransport;
use tetherd::relay::RelayCore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tetherd.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        server = %config.server.name,
        broker = config.broker.enabled,
        "Starting tetherd"
    );

    let registry = Arc::new(SessionRegistry::new());
    let transport = Arc::new(TcpTunnelTransport::new(config.broker.bind_address));
    let _core = RelayCore::new(&config, registry, transport);

    info!("Relay core ready");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
