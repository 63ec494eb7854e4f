//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
///
/// Every decryption failure mode is distinguishable here for local diagnostics,
/// but callers must treat them uniformly: none of them yields plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Payload is not valid base64
    #[error("Payload is not valid base64")]
    MalformedEncoding,

    /// Decoded payload cannot hold a nonce and a tag
    #[error("Payload too short: expected at least {minimum} bytes, got {actual}")]
    PayloadTooShort {
        /// Minimum decoded length in bytes
        minimum: usize,
        /// Actual decoded length in bytes
        actual: usize,
    },

    /// AEAD tag verification failed (wrong key or tampered payload)
    #[error("Authentication tag verification failed")]
    AuthenticationFailed,

    /// No candidate key was available for trial decryption
    #[error("No candidate keys available")]
    NoCandidateKeys,

    /// Encryption failed
    #[error("Encryption failed")]
    EncryptionFailed,
}

impl CryptoError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CryptoError::MalformedEncoding => "malformed_encoding",
            CryptoError::PayloadTooShort { .. } => "payload_too_short",
            CryptoError::AuthenticationFailed => "authentication_failed",
            CryptoError::NoCandidateKeys => "no_candidate_keys",
            CryptoError::EncryptionFailed => "encryption_failed",
        }
    }
}
