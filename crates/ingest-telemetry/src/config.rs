//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to log lines
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Whether to include source file and line in log lines
    pub with_source_location: bool,

    /// Deployment environment (dev, staging, production)
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "sms-ingest".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            with_source_location: false,
            environment: "dev".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `INGEST_SERVICE_NAME`: Service name (default: sms-ingest)
    /// - `INGEST_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `INGEST_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `INGEST_LOG_SOURCE`: Include file/line (default: false)
    /// - `INGEST_ENVIRONMENT`: Environment name (default: dev)
    pub fn from_env() -> Self {
        let is_container = env::var("KUBERNETES_SERVICE_HOST").is_ok()
            || env::var("DOCKER_CONTAINER").is_ok()
            || env::var("K_SERVICE").is_ok();

        Self {
            service_name: env::var("INGEST_SERVICE_NAME")
                .unwrap_or_else(|_| "sms-ingest".to_string()),

            log_level: env::var("INGEST_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("INGEST_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_container),

            with_source_location: env::var("INGEST_LOG_SOURCE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),

            environment: env::var("INGEST_ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
