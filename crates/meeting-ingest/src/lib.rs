//! # Meeting Ingest
//!
//! The decrypt-validate-persist pipeline for meeting-lifecycle SMS.
//!
//! ## Pipeline
//!
//! ```text
//! webhook ─→ authenticate ─→ outer parse ─→ decrypt ─→ inner parse ─→ normalize ─→ upsert
//!                 │                 │            │            │                      │
//!             Forbidden             └────────────┴────────────┴──────→ failure log ←─┘
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Auth first | Unauthenticated deliveries never reach either store |
//! | Fail closed | Plaintext is used only after the GCM tag verifies |
//! | Key binding | The record's group must match the key that opened it |
//! | Exactly once | At most one meeting log row per meeting id, any interleaving |
//! | Audit | Every post-auth failure attempts one failure-log row |
//! | Non-masking | A failure-log outage never changes the response |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Envelope and record grammars, entities, errors
//! - `ports/` - `IngestApi` (inbound), `MeetingEventStore` and `FailureLog` (outbound)
//! - `adapters/` - In-memory and PostgreSQL stores
//! - `service/` - `IngestService`, the state machine
//!
//! ## Usage
//!
//! ```ignore
//! use meeting_ingest::{IngestApi, IngestRequest, IngestService, PipelineConfig};
//!
//! let service = IngestService::new_in_memory(&config)?;
//! let outcome = service.ingest(request).await;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{
    InMemoryFailureLog, InMemoryMeetingEventStore, PostgresClient, PostgresFailureLog,
    PostgresMeetingEventStore, PostgresSettings,
};
pub use config::{ConfigError, PipelineConfig};
pub use domain::auth::{constant_time_compare, WebhookAuthenticator};
pub use domain::entities::{
    FailureRecord, IncomingMessage, MeetingLogEntry, MessageOrigin, NormalizedEvent,
    PipelineStage, UpsertOutcome, UNKNOWN,
};
pub use domain::envelope::{AddressedHeader, EnvelopeFormat, WireEnvelope};
pub use domain::errors::{
    AuthError, DecryptError, FormatError, PersistenceError, PipelineError, ValidationError,
};
pub use domain::record::DecryptedRecord;
pub use domain::version::{format_version, parse_meeting_time};
pub use ports::inbound::{IngestApi, IngestOutcome, IngestRequest, IngestResponse};
pub use ports::outbound::{FailureLog, MeetingEventStore};
pub use service::{IngestDependencies, IngestService};
