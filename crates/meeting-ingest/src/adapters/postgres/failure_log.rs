use async_trait::async_trait;
use tracing::debug;

use crate::adapters::postgres::client::PostgresClient;
use crate::domain::entities::FailureRecord;
use crate::domain::errors::PersistenceError;
use crate::ports::outbound::FailureLog;

/// `sms_failed_decrypt_log` writer. Rows carrying a meeting id are inserted
/// at most once.
#[derive(Clone)]
pub struct PostgresFailureLog {
    client: PostgresClient,
}

impl PostgresFailureLog {
    /// Writer over a pooled client.
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FailureLog for PostgresFailureLog {
    async fn append_failure(&self, record: &FailureRecord) -> Result<(), PersistenceError> {
        debug!(stage = %record.failed_stage, "Appending failure record");

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;

        conn.execute(
            "INSERT INTO sms_failed_decrypt_log (from_number, to_dsl_number, raw_sms,
                error_reason, failed_stage, meeting_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT DO NOTHING",
            &[
                &record.from_number,
                &record.to_number,
                &record.raw_message,
                &record.reason,
                &record.failed_stage.as_str(),
                &record.meeting_id,
                &record.recorded_at,
            ],
        )
        .await
        .map_err(|e| PersistenceError::Query(e.to_string()))?;

        Ok(())
    }
}
