//! sqlmap Gate API Server

use clap::Parser;
use sg_api::{build_router, logging, AppState, ServerConfig, ServerError};
use sg_core::{GateConfig, ScanGate};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = ServerConfig::parse();

    logging::init_logging(&config.log_dir)?;

    info!("Starting sqlmap gate");

    let gate_config = match &config.config {
        Some(path) => GateConfig::load(path)?,
        None => {
            info!("No gate config given, using built-in lab targets");
            GateConfig::default()
        }
    };

    let gate = ScanGate::from_config(&gate_config)?;

    if !gate.tool().is_available().await {
        warn!("{} is not installed yet; /run_sqlmap answers 500 until it appears on PATH", gate.tool().name());
    }

    info!(
        "{} targets whitelisted, {} forbidden flag patterns, {}s timeout",
        gate.registry().len(),
        gate.policy().patterns().len(),
        gate_config.timeout_secs
    );

    // Create shared state
    let state = Arc::new(AppState::new(
        gate,
        config.default_per_minute,
        config.scan_per_minute,
    )?);

    let pruned = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            pruned.default_limit.prune();
            pruned.scan_limit.prune();
        }
    });

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("Listening on {}", config.bind);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
