//! Gateway startup and serving errors.

use thiserror::Error;

use crate::domain::config::ConfigError;

/// Errors that stop the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage could not be prepared
    #[error("storage initialization failed: {0}")]
    Storage(String),

    /// Socket bind or serve failure
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<meeting_ingest::ConfigError> for GatewayError {
    fn from(err: meeting_ingest::ConfigError) -> Self {
        GatewayError::Config(err.into())
    }
}
