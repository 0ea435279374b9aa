use std::net::SocketAddr;

use anyhow::{Context, Result};
use skylog_core::Config;
use skylog_server::{routes, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    skylog_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    tracing::info!("Config directory: {}", config.config_dir.display());

    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_address))?;

    let state = AppState::from_config(&config)?;

    let (bound, server) = warp::serve(routes(&state))
        .try_bind_with_graceful_shutdown(addr, shutdown_signal())
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Skylog listening on http://{}", bound);
    server.await;
    tracing::info!("Skylog stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
