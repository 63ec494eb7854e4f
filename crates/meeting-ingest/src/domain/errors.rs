//! # Domain Errors
//!
//! Error taxonomy for the ingest pipeline.
//!
//! ## Design Principles
//!
//! - One enum per failure class: auth, outer format, decrypt, inner validation, persistence
//! - `Display` of the data-quality errors is the short reason returned to the sender
//! - Persistence errors carry backend detail for logs only; `reason()` hides it

use shared_crypto::CryptoError;
use thiserror::Error;

/// Sender authentication failures. Never written to the failure log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No secret in body or header.
    #[error("webhook secret missing")]
    MissingSecret,

    /// Secret present but wrong.
    #[error("webhook secret mismatch")]
    SecretMismatch,
}

/// Outer envelope grammar violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Message body absent or blank.
    #[error("Empty SMS content")]
    EmptyContent,

    /// No `:` between tag and payload.
    #[error("Invalid SMS format: missing ':'")]
    MissingDelimiter,

    /// Tag is not one of the accepted sentinels.
    #[error("Invalid tag: expected {expected}")]
    TagMismatch {
        /// Accepted sentinels, for the sender's benefit.
        expected: String,
    },

    /// Nothing after the tag delimiter.
    #[error("Empty encrypted payload")]
    EmptyPayload,

    /// Addressed envelope without its group or meeting header.
    #[error("Invalid SMS format: missing group or meeting header")]
    MissingHeader,
}

/// Payload could not be authenticated and decrypted.
///
/// Deliberately opaque to the sender: malformed base64, short buffers, and tag
/// mismatches all produce the same reason. The cause is kept for local logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Decryption failed: invalid encrypted payload")]
pub struct DecryptError {
    cause: CryptoError,
}

impl DecryptError {
    /// Underlying crypto failure, for diagnostics.
    pub fn cause(&self) -> &CryptoError {
        &self.cause
    }
}

impl From<CryptoError> for DecryptError {
    fn from(cause: CryptoError) -> Self {
        Self { cause }
    }
}

/// Decrypted record violates the inner grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Plaintext is not valid UTF-8.
    #[error("Invalid decrypted payload: not UTF-8 text")]
    NotUtf8,

    /// Wrong number of comma-separated fields.
    #[error("Invalid decrypted payload: expected 4 CSV fields, got {actual}")]
    FieldCount {
        /// Fields found.
        actual: usize,
    },

    /// A required field is blank.
    #[error("Invalid payload: field '{field}' is empty")]
    EmptyField {
        /// Name of the blank field.
        field: &'static str,
    },

    /// Record names a different group than the key that opened it.
    #[error("Tampered group number")]
    GroupMismatch,

    /// Record names a different meeting than the cleartext header.
    #[error("Tampered meeting number")]
    MeetingMismatch,
}

/// Backend write failure on either persistence path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Could not obtain a connection.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Statement failed.
    #[error("storage query failed: {0}")]
    Query(String),
}

/// Any failure of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Sender not authenticated.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Outer envelope rejected.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Payload not decryptable.
    #[error(transparent)]
    Decrypt(#[from] DecryptError),

    /// Inner record rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Success-path write failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl PipelineError {
    /// Short, user-visible reason. Never contains backend detail.
    pub fn reason(&self) -> String {
        match self {
            PipelineError::Auth(_) => "Forbidden".to_string(),
            PipelineError::Persistence(_) => "Failed to store meeting event".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether a redelivery of the same message could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Persistence(_))
    }

    /// Metric/log label of the step that failed.
    pub fn step(&self) -> &'static str {
        match self {
            PipelineError::Auth(_) => "authenticate",
            PipelineError::Format(_) => "outer_parse",
            PipelineError::Decrypt(_) => "decrypt",
            PipelineError::Validation(_) => "inner_parse",
            PipelineError::Persistence(_) => "persist",
        }
    }
}

/// Result type for pipeline steps
pub type PipelineResult<T> = Result<T, PipelineError>;
