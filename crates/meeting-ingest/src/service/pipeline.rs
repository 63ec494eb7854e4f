//! Steps after authentication, one state transition each.

use shared_crypto::{decrypt_payload, decrypt_with_any};

use super::IngestService;
use crate::domain::entities::{IncomingMessage, MeetingLogEntry, NormalizedEvent, PipelineStage};
use crate::domain::envelope::WireEnvelope;
use crate::domain::errors::{DecryptError, PipelineResult, ValidationError};
use crate::domain::record::DecryptedRecord;
use crate::ports::outbound::{FailureLog, MeetingEventStore};

impl<S, F> IngestService<S, F>
where
    S: MeetingEventStore,
    F: FailureLog,
{
    /// Outer parse through normalization. `stage` tracks the last state reached.
    pub(crate) fn prepare(
        &self,
        message: &IncomingMessage,
        stage: &mut PipelineStage,
    ) -> PipelineResult<MeetingLogEntry> {
        let envelope = WireEnvelope::parse(&message.body, &self.formats)?;
        stage.transition(PipelineStage::OuterParsed);

        let (plaintext, opened_by) = self.open(&envelope)?;
        stage.transition(PipelineStage::Decrypted);

        let text = String::from_utf8(plaintext).map_err(|_| ValidationError::NotUtf8)?;
        let record = DecryptedRecord::parse(&text)?;
        check_binding(&record, &envelope, opened_by.as_deref())?;
        stage.transition(PipelineStage::InnerParsed);

        let event = NormalizedEvent::from_record(record, envelope.payload, text);
        stage.transition(PipelineStage::Normalized);

        Ok(MeetingLogEntry {
            event,
            raw_message: message.body.clone(),
            origin: message.origin.clone(),
        })
    }

    /// Decrypt the payload, returning the plaintext and the group whose key
    /// opened it (`None` for the root key).
    ///
    /// Keys are derived here and zeroized when this call returns.
    fn open(&self, envelope: &WireEnvelope) -> Result<(Vec<u8>, Option<String>), DecryptError> {
        match &envelope.header {
            Some(header) => {
                let key = self.key_ring.key_for(&header.group_id);
                let plaintext = decrypt_payload(&envelope.payload, &key)?;
                Ok((plaintext, Some(header.group_id.clone())))
            }
            None => {
                let candidates = self.key_ring.candidates();
                let (idx, plaintext) = decrypt_with_any(&envelope.payload, &candidates)?;
                Ok((plaintext, candidates[idx].group_id.clone()))
            }
        }
    }
}

/// The authenticated record must agree with whatever selected its key.
fn check_binding(
    record: &DecryptedRecord,
    envelope: &WireEnvelope,
    opened_by: Option<&str>,
) -> Result<(), ValidationError> {
    if let Some(group) = opened_by {
        if record.group_id != group {
            return Err(ValidationError::GroupMismatch);
        }
    }
    if let Some(header) = &envelope.header {
        if record.meeting_id != header.meeting_id {
            return Err(ValidationError::MeetingMismatch);
        }
    }
    Ok(())
}
