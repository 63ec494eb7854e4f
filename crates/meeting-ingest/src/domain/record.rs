//! Inner record grammar: `groupId,meetingId,versionRaw,timestampRaw`.

use crate::domain::errors::ValidationError;

/// Number of comma-separated fields in a decrypted record.
pub const FIELD_COUNT: usize = 4;

const FIELD_NAMES: [&str; FIELD_COUNT] = ["groupId", "meetingId", "version", "timestamp"];

/// The four fields of a decrypted payload, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedRecord {
    /// Group that ran the meeting.
    pub group_id: String,
    /// Meeting identifier.
    pub meeting_id: String,
    /// Undotted app version digits.
    pub version_raw: String,
    /// Meeting timestamp as sent.
    pub timestamp_raw: String,
}

impl DecryptedRecord {
    /// Split and validate a decrypted plaintext.
    ///
    /// Exactly four fields; no field may be blank after trimming.
    pub fn parse(plaintext: &str) -> Result<Self, ValidationError> {
        let fields: Vec<&str> = plaintext.trim().split(',').map(str::trim).collect();
        if fields.len() != FIELD_COUNT {
            return Err(ValidationError::FieldCount {
                actual: fields.len(),
            });
        }

        if let Some(idx) = fields.iter().position(|f| f.is_empty()) {
            return Err(ValidationError::EmptyField {
                field: FIELD_NAMES[idx],
            });
        }

        Ok(Self {
            group_id: fields[0].to_string(),
            meeting_id: fields[1].to_string(),
            version_raw: fields[2].to_string(),
            timestamp_raw: fields[3].to_string(),
        })
    }

    /// Decode plaintext bytes as UTF-8, then [`parse`](Self::parse).
    pub fn from_bytes(plaintext: &[u8]) -> Result<Self, ValidationError> {
        let text = std::str::from_utf8(plaintext).map_err(|_| ValidationError::NotUtf8)?;
        Self::parse(text)
    }
}
