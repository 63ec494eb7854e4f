//! # Wire Envelope
//!
//! Outer grammar of an inbound SMS body.
//!
//! | Format | Shape | Key selection |
//! |--------|-------|---------------|
//! | Compact | `ds:PAYLOAD` | trial over the configured key ring |
//! | Addressed | `dreamstart:GROUP:MEETING:PAYLOAD` | derived from `GROUP` |
//!
//! Tags compare case-insensitively after trimming. The payload is trimmed
//! before it reaches the decryptor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::FormatError;

/// Sentinel of the compact format.
pub const COMPACT_TAG: &str = "ds";

/// Sentinel of the addressed format.
pub const ADDRESSED_TAG: &str = "dreamstart";

/// Accepted outer grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeFormat {
    /// `ds:PAYLOAD`
    Compact,
    /// `dreamstart:GROUP:MEETING:PAYLOAD`
    Addressed,
}

impl EnvelopeFormat {
    /// Lowercase tag this format starts with.
    pub fn tag(self) -> &'static str {
        match self {
            EnvelopeFormat::Compact => COMPACT_TAG,
            EnvelopeFormat::Addressed => ADDRESSED_TAG,
        }
    }
}

impl fmt::Display for EnvelopeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeFormat::Compact => f.write_str("compact"),
            EnvelopeFormat::Addressed => f.write_str("addressed"),
        }
    }
}

impl FromStr for EnvelopeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | COMPACT_TAG => Ok(EnvelopeFormat::Compact),
            "addressed" | ADDRESSED_TAG => Ok(EnvelopeFormat::Addressed),
            other => Err(format!("unknown envelope format '{}'", other)),
        }
    }
}

/// Cleartext routing header of the addressed format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedHeader {
    /// Group named in the header.
    pub group_id: String,
    /// Meeting named in the header.
    pub meeting_id: String,
}

/// A parsed outer envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireEnvelope {
    /// Which grammar matched.
    pub format: EnvelopeFormat,
    /// Tag as sent, trimmed.
    pub tag: String,
    /// Header, present only for [`EnvelopeFormat::Addressed`].
    pub header: Option<AddressedHeader>,
    /// Trimmed base64 ciphertext.
    pub payload: String,
}

impl WireEnvelope {
    /// Parse `raw` against the accepted formats.
    ///
    /// # Errors
    ///
    /// - `EmptyContent`: body absent or blank
    /// - `MissingDelimiter`: no `:`
    /// - `TagMismatch`: tag not accepted
    /// - `MissingHeader`: addressed body lacks group or meeting
    /// - `EmptyPayload`: nothing after the last delimiter
    pub fn parse(raw: &str, accepted: &[EnvelopeFormat]) -> Result<Self, FormatError> {
        if raw.trim().is_empty() {
            return Err(FormatError::EmptyContent);
        }

        let (tag, rest) = raw.split_once(':').ok_or(FormatError::MissingDelimiter)?;
        let tag = tag.trim();

        let format = accepted
            .iter()
            .copied()
            .find(|f| tag.eq_ignore_ascii_case(f.tag()))
            .ok_or_else(|| FormatError::TagMismatch {
                expected: expected_tags(accepted),
            })?;

        let (header, payload) = match format {
            EnvelopeFormat::Compact => (None, rest.trim()),
            EnvelopeFormat::Addressed => {
                let mut parts = rest.splitn(3, ':');
                let group_id = parts.next().map(str::trim).unwrap_or_default();
                let meeting_id = parts.next().map(str::trim).unwrap_or_default();
                let payload = parts.next().ok_or(FormatError::MissingHeader)?;
                if group_id.is_empty() || meeting_id.is_empty() {
                    return Err(FormatError::MissingHeader);
                }
                let header = AddressedHeader {
                    group_id: group_id.to_string(),
                    meeting_id: meeting_id.to_string(),
                };
                (Some(header), payload.trim())
            }
        };

        if payload.is_empty() {
            return Err(FormatError::EmptyPayload);
        }

        Ok(Self {
            format,
            tag: tag.to_string(),
            header,
            payload: payload.to_string(),
        })
    }
}

fn expected_tags(accepted: &[EnvelopeFormat]) -> String {
    accepted
        .iter()
        .map(|f| format!("'{}'", f.tag().to_ascii_uppercase()))
        .collect::<Vec<_>>()
        .join(" or ")
}
