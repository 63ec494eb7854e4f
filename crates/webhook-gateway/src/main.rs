//! Webhook gateway binary.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging and metrics
//! 2. Load and validate configuration from the environment
//! 3. Connect storage and apply the schema
//! 4. Serve until Ctrl-C or SIGTERM, then drain

use anyhow::{Context, Result};
use ingest_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;
use webhook_gateway::{serve, GatewayConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())?;

    let config = GatewayConfig::from_env().context("invalid configuration")?;
    info!(
        addr = %config.http_addr(),
        backend = ?config.storage.backend,
        timeout_ms = config.limits.request_timeout.as_millis() as u64,
        "Configuration loaded"
    );

    serve(config, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
