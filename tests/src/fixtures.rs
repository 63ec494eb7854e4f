//! Shared test fixtures.

use std::sync::Arc;

use meeting_ingest::{
    EnvelopeFormat, IncomingMessage, IngestRequest, IngestService, InMemoryFailureLog,
    InMemoryMeetingEventStore, MessageOrigin, PipelineConfig,
};
use shared_crypto::{derive_group_key, encrypt_payload, SharedSecret};

/// Sender secret used throughout.
pub const WEBHOOK_SECRET: &str = "hook-secret";

/// Key-derivation secret used throughout.
pub const SHARED_SECRET: &str = "test-secret";

/// `GROUP1,M100,130,1700000000` sealed under `HMAC-SHA256("test-secret", "GROUP1")`
/// with nonce `00 01 .. 0b`, produced by an independent AES-GCM implementation.
pub const KNOWN_PAYLOAD: &str =
    "AAECAwQFBgcICQoL8qmeDUriC2bJKW/w/9mj6Q3SFCSC13QPeTM8Cjwaz1SIOxe4gRpnJ8qy";

/// Plaintext inside [`KNOWN_PAYLOAD`].
pub const KNOWN_PLAINTEXT: &str = "GROUP1,M100,130,1700000000";

/// In-memory pipeline type used by scenarios.
pub type MemoryPipeline = IngestService<InMemoryMeetingEventStore, InMemoryFailureLog>;

/// Compact-only config knowing `GROUP1` and `GROUP2`.
pub fn compact_config() -> PipelineConfig {
    PipelineConfig {
        webhook_secret: WEBHOOK_SECRET.to_string(),
        shared_secret: SHARED_SECRET.to_string(),
        known_groups: vec!["GROUP1".to_string(), "GROUP2".to_string()],
        root_key_fallback: false,
        envelope_formats: vec![EnvelopeFormat::Compact],
    }
}

/// Shared in-memory pipeline over [`compact_config`].
pub fn memory_pipeline() -> Arc<MemoryPipeline> {
    Arc::new(IngestService::new_in_memory(&compact_config()).expect("valid config"))
}

/// Seal `plaintext` under the key for `group` with a fresh nonce.
pub fn seal(group: &str, plaintext: &str) -> String {
    let key = derive_group_key(&SharedSecret::from(SHARED_SECRET), group);
    encrypt_payload(plaintext.as_bytes(), &key).expect("encryption")
}

/// Authenticated request carrying `body`.
pub fn authed(body: impl Into<String>) -> IngestRequest {
    IngestRequest {
        message: IncomingMessage::new(
            body,
            MessageOrigin::new(
                Some("+254700000001".to_string()),
                Some("+254700000999".to_string()),
                Some("KE".to_string()),
            ),
        ),
        body_secret: Some(WEBHOOK_SECRET.to_string()),
        header_secret: None,
    }
}
