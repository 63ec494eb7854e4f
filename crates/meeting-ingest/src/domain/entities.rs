//! # Domain Entities
//!
//! Values that flow through one pipeline invocation, from the raw inbound
//! message to the persisted meeting log row or failure record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::record::DecryptedRecord;
use crate::domain::version::{format_version, parse_meeting_time};

/// Placeholder for absent sender metadata.
pub const UNKNOWN: &str = "unknown";

// =============================================================================
// INBOUND
// =============================================================================

/// Sender metadata supplied by the SMS gateway. Every field is always set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageOrigin {
    /// Sending handset number.
    pub from_number: String,
    /// Receiving (gateway) number.
    pub to_number: String,
    /// Country of the sending network.
    pub country: String,
}

impl MessageOrigin {
    /// Build from optional fields, substituting `"unknown"` for anything
    /// missing or blank.
    pub fn new(
        from_number: Option<String>,
        to_number: Option<String>,
        country: Option<String>,
    ) -> Self {
        Self {
            from_number: or_unknown(from_number),
            to_number: or_unknown(to_number),
            country: or_unknown(country),
        }
    }

    /// Origin with every field unknown.
    pub fn unknown() -> Self {
        Self::new(None, None, None)
    }
}

impl Default for MessageOrigin {
    fn default() -> Self {
        Self::unknown()
    }
}

fn or_unknown(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// One inbound SMS as handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Raw message text, exactly as received.
    pub body: String,
    /// Sender metadata.
    pub origin: MessageOrigin,
}

impl IncomingMessage {
    /// New message.
    pub fn new(body: impl Into<String>, origin: MessageOrigin) -> Self {
        Self {
            body: body.into(),
            origin,
        }
    }
}

// =============================================================================
// PIPELINE STATE
// =============================================================================

/// States a message passes through, strictly in declaration order.
///
/// ```text
/// Unauthenticated -> Authenticated -> OuterParsed -> Decrypted
///                 -> InnerParsed -> Normalized -> Persisted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Received, sender not yet checked.
    Unauthenticated,
    /// Shared webhook secret verified.
    Authenticated,
    /// Envelope tag and payload extracted.
    OuterParsed,
    /// Payload authenticated and decrypted.
    Decrypted,
    /// Plaintext split into its four fields.
    InnerParsed,
    /// Event built with formatted version.
    Normalized,
    /// Event row upserted.
    Persisted,
}

impl PipelineStage {
    /// Following state, `None` once persisted.
    pub fn next(self) -> Option<Self> {
        use PipelineStage::*;
        match self {
            Unauthenticated => Some(Authenticated),
            Authenticated => Some(OuterParsed),
            OuterParsed => Some(Decrypted),
            Decrypted => Some(InnerParsed),
            InnerParsed => Some(Normalized),
            Normalized => Some(Persisted),
            Persisted => None,
        }
    }

    /// Advance to `to`, which must be the immediate successor.
    pub fn transition(&mut self, to: PipelineStage) {
        debug_assert_eq!(self.next(), Some(to), "out-of-order stage transition");
        *self = to;
    }

    /// Lowercase label for logs and the failure table.
    pub fn as_str(self) -> &'static str {
        use PipelineStage::*;
        match self {
            Unauthenticated => "unauthenticated",
            Authenticated => "authenticated",
            OuterParsed => "outer_parsed",
            Decrypted => "decrypted",
            InnerParsed => "inner_parsed",
            Normalized => "normalized",
            Persisted => "persisted",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// OUTBOUND
// =============================================================================

/// Validated meeting event, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    /// Group that ran the meeting.
    pub group_id: String,
    /// Meeting identifier; the idempotency key.
    pub meeting_id: String,
    /// Dotted app version, see [`format_version`].
    pub version: String,
    /// Raw timestamp field as sent.
    pub timestamp_raw: String,
    /// Parsed meeting instant, when the raw field is Unix seconds.
    pub meeting_time: Option<DateTime<Utc>>,
    /// Base64 payload as received.
    pub encrypted_payload: String,
    /// Decrypted CSV record.
    pub decrypted_message: String,
    /// Always true for this pipeline.
    pub was_encrypted: bool,
}

impl NormalizedEvent {
    /// Build from a parsed record plus the texts it came from.
    pub fn from_record(
        record: DecryptedRecord,
        encrypted_payload: impl Into<String>,
        decrypted_message: impl Into<String>,
    ) -> Self {
        let version = format_version(&record.version_raw);
        let meeting_time = parse_meeting_time(&record.timestamp_raw);
        Self {
            group_id: record.group_id,
            meeting_id: record.meeting_id,
            version,
            timestamp_raw: record.timestamp_raw,
            meeting_time,
            encrypted_payload: encrypted_payload.into(),
            decrypted_message: decrypted_message.into(),
            was_encrypted: true,
        }
    }
}

/// Full row written to the meeting log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingLogEntry {
    /// The normalized event.
    pub event: NormalizedEvent,
    /// Raw SMS body.
    pub raw_message: String,
    /// Sender metadata.
    pub origin: MessageOrigin,
}

/// Result of an idempotent upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    /// New row written.
    Inserted,
    /// A row with this meeting id already existed; nothing changed.
    Duplicate,
}

impl UpsertOutcome {
    /// Metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            UpsertOutcome::Inserted => "inserted",
            UpsertOutcome::Duplicate => "duplicate",
        }
    }
}

/// Audit row for a message that could not be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Sending handset number.
    pub from_number: String,
    /// Receiving number.
    pub to_number: String,
    /// Raw SMS body.
    pub raw_message: String,
    /// User-visible failure reason.
    pub reason: String,
    /// Last state reached before the failure.
    pub failed_stage: PipelineStage,
    /// Meeting a retryable failure concerns. At most one row is kept per
    /// meeting id; rows without one are always appended.
    pub meeting_id: Option<String>,
    /// When the failure was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl FailureRecord {
    /// Record for `message` failing after `failed_stage`.
    pub fn new(
        message: &IncomingMessage,
        reason: impl Into<String>,
        failed_stage: PipelineStage,
    ) -> Self {
        Self {
            from_number: message.origin.from_number.clone(),
            to_number: message.origin.to_number.clone(),
            raw_message: message.body.clone(),
            reason: reason.into(),
            failed_stage,
            meeting_id: None,
            recorded_at: Utc::now(),
        }
    }
}
