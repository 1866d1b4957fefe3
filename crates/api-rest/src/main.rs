//! `ml-benchmark-api` server binary.

use anyhow::{Context, Result};
use clap::Parser;
use ml_benchmark_api_rest::{create_app, AppState, ServeArgs};
use ml_benchmark_common::telemetry::init_tracing;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServeArgs::parse();
    let config = args.load_config()?;

    init_tracing(
        &config.telemetry.service_name,
        config.telemetry.json_logging,
        &config.telemetry.log_level,
    )?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(
        environment = %config.environment,
        backend = ?config.storage.backend,
        root_dir = %config.storage.root_dir.display(),
        "Starting ML benchmark API"
    );

    let state = AppState::from_config(config).await?;
    let app = create_app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        // Without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
