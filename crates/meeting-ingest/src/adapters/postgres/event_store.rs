use async_trait::async_trait;
use tracing::{debug, info};

use crate::adapters::postgres::client::PostgresClient;
use crate::domain::entities::{MeetingLogEntry, UpsertOutcome};
use crate::domain::errors::PersistenceError;
use crate::ports::outbound::MeetingEventStore;

/// `sms_meeting_log` writer. Conflicts on `meeting_id` are absorbed by the
/// database, so overlapping deliveries cannot produce a second row.
#[derive(Clone)]
pub struct PostgresMeetingEventStore {
    client: PostgresClient,
}

impl PostgresMeetingEventStore {
    /// Writer over a pooled client.
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MeetingEventStore for PostgresMeetingEventStore {
    async fn upsert_event(
        &self,
        entry: &MeetingLogEntry,
    ) -> Result<UpsertOutcome, PersistenceError> {
        let event = &entry.event;
        debug!(meeting_id = %event.meeting_id, "Upserting meeting event");

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;

        let rows = conn
            .execute(
                "INSERT INTO sms_meeting_log (meeting_id, group_id, meeting_time, meeting_time_raw,
                    version, encrypted_payload, decrypted_message, raw_sms, country, from_number,
                    to_dsl_number)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                 ON CONFLICT (meeting_id) DO NOTHING",
                &[
                    &event.meeting_id,
                    &event.group_id,
                    &event.meeting_time,
                    &event.timestamp_raw,
                    &event.version,
                    &event.encrypted_payload,
                    &event.decrypted_message,
                    &entry.raw_message,
                    &entry.origin.country,
                    &entry.origin.from_number,
                    &entry.origin.to_number,
                ],
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        let outcome = if rows == 0 {
            UpsertOutcome::Duplicate
        } else {
            UpsertOutcome::Inserted
        };
        info!(meeting_id = %event.meeting_id, result = outcome.as_str(), "Meeting event upserted");
        Ok(outcome)
    }
}
