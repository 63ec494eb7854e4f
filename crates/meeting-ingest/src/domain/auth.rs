//! Webhook sender authentication.
//!
//! The SMS gateway proves itself with a shared secret, either in the request
//! body or in the `x-webhook-secret` header. Comparison is constant-time.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::domain::errors::AuthError;

/// Constant-time string equality.
///
/// Both sides are hashed first so neither the length nor the position of the
/// first differing byte leaks through timing.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let da = Sha256::digest(a.as_bytes());
    let db = Sha256::digest(b.as_bytes());
    da.as_slice().ct_eq(db.as_slice()).into()
}

/// Verifies the shared webhook secret.
#[derive(Clone)]
pub struct WebhookAuthenticator {
    expected: String,
}

impl WebhookAuthenticator {
    /// Authenticator expecting `secret`.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            expected: secret.into(),
        }
    }

    /// Check the first non-empty candidate secret.
    ///
    /// Candidates are tried in order (body field, then header); an empty
    /// string counts as absent.
    pub fn verify<'a, I>(&self, candidates: I) -> Result<(), AuthError>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let provided = candidates
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .ok_or(AuthError::MissingSecret)?;

        if constant_time_compare(provided, &self.expected) {
            Ok(())
        } else {
            Err(AuthError::SecretMismatch)
        }
    }
}

impl std::fmt::Debug for WebhookAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookAuthenticator")
            .field("expected", &"[REDACTED]")
            .finish()
    }
}
