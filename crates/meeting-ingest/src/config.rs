//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use shared_crypto::{GroupKeyRing, SharedSecret};
use thiserror::Error;

use crate::domain::envelope::EnvelopeFormat;

/// Immutable settings for one [`IngestService`](crate::IngestService).
#[derive(Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Secret the SMS gateway presents.
    pub webhook_secret: String,
    /// Secret every group key is derived from.
    pub shared_secret: String,
    /// Groups tried when a compact envelope arrives.
    pub known_groups: Vec<String>,
    /// Also try the key derived over the empty group id.
    pub root_key_fallback: bool,
    /// Accepted outer grammars, in matching order.
    pub envelope_formats: Vec<EnvelopeFormat>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            webhook_secret: String::new(),
            shared_secret: String::new(),
            known_groups: Vec::new(),
            root_key_fallback: false,
            envelope_formats: vec![EnvelopeFormat::Compact],
        }
    }
}

impl PipelineConfig {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.webhook_secret.is_empty() {
            return Err(ConfigError::MissingSecret("webhook secret"));
        }
        if self.shared_secret.is_empty() {
            return Err(ConfigError::MissingSecret("shared secret"));
        }
        if self.envelope_formats.is_empty() {
            return Err(ConfigError::NoEnvelopeFormats);
        }
        if self.envelope_formats.contains(&EnvelopeFormat::Compact) && self.key_ring().is_empty() {
            return Err(ConfigError::EmptyKeyRing);
        }
        Ok(())
    }

    /// Key ring over the known groups.
    pub fn key_ring(&self) -> GroupKeyRing {
        GroupKeyRing::new(
            SharedSecret::from(self.shared_secret.as_str()),
            &self.known_groups,
        )
        .with_root_fallback(self.root_key_fallback)
    }
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("webhook_secret", &"[REDACTED]")
            .field("shared_secret", &"[REDACTED]")
            .field("known_groups", &self.known_groups)
            .field("root_key_fallback", &self.root_key_fallback)
            .field("envelope_formats", &self.envelope_formats)
            .finish()
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required secret is empty
    #[error("{0} is required")]
    MissingSecret(&'static str),
    /// No envelope grammar enabled
    #[error("at least one envelope format must be enabled")]
    NoEnvelopeFormats,
    /// Compact envelopes enabled with nothing to trial-decrypt with
    #[error("compact envelopes need known groups or the root key fallback")]
    EmptyKeyRing,
}
