//! Kryos webhook relay.
//!
//! Main entry point. Loads configuration, installs logging and serves the
//! relay until CTRL+C or SIGTERM.

use anyhow::{Context, Result};
use kryos_api::{AppState, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!("Starting Kryos webhook relay");
    info!(
        auth = %config.auth_scheme,
        host = %config.host,
        port = config.port,
        replay_window_ms = ?config.replay_window_ms,
        security_alerts = config.security_destination().is_some(),
        "Configuration loaded"
    );

    let addr = config.parse_server_addr()?;
    let state = AppState::new(config).context("Failed to build delivery client")?;

    kryos_api::start_server(state, addr).await.context("Server failed")?;

    info!("Kryos shutdown complete");
    Ok(())
}

/// Initializes tracing. `RUST_LOG` from the environment wins over the
/// configured filter.
fn init_tracing(configured: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
