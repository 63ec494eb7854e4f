//! # Ingest Telemetry
//!
//! Logging and metrics for the Meeting-SMS ingest service.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with env-filter, pretty or JSON lines
//! - **Metrics**: Prometheus counters and histograms, scraped from `/metrics`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ingest_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `INGEST_SERVICE_NAME` | `sms-ingest` | Service name in logs |
//! | `INGEST_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `INGEST_JSON_LOGS` | `false` | JSON log lines (default on in containers) |
//! | `INGEST_LOG_SOURCE` | `false` | Include file and line |
//! | `INGEST_ENVIRONMENT` | `dev` | Deployment environment label |

#![warn(missing_docs)]

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, EVENTS_PERSISTED, FAILURE_LOG_WRITE_ERRORS,
    MESSAGES_RECEIVED, PIPELINE_DURATION, PIPELINE_FAILURES,
};
pub use tracing_setup::{build_env_filter, TracingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    /// Metrics registry failure
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Bad configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first so early log lines can't race the registry
    let metrics_handle = register_metrics()?;

    let tracing_guard = tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
