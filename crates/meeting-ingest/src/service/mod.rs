//! # Ingest Service
//!
//! Orchestrates one delivery through the pipeline state machine.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `IngestApi` for the webhook gateway
//! 2. Authenticates before anything else; rejections never touch storage
//! 3. Routes every later failure to the failure log, best-effort
//! 4. Takes both stores by injection, so tests run fully in memory

mod pipeline;

use async_trait::async_trait;
use ingest_telemetry::{
    metric_inc, time_histogram, EVENTS_PERSISTED, FAILURE_LOG_WRITE_ERRORS, MESSAGES_RECEIVED,
    PIPELINE_DURATION, PIPELINE_FAILURES,
};
use shared_crypto::GroupKeyRing;
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::memory::{InMemoryFailureLog, InMemoryMeetingEventStore};
use crate::config::{ConfigError, PipelineConfig};
use crate::domain::auth::WebhookAuthenticator;
use crate::domain::entities::{FailureRecord, IncomingMessage, PipelineStage};
use crate::domain::envelope::EnvelopeFormat;
use crate::domain::errors::PipelineError;
use crate::ports::inbound::{IngestApi, IngestOutcome, IngestRequest};
use crate::ports::outbound::{FailureLog, MeetingEventStore};

/// The Ingest Service.
pub struct IngestService<S, F>
where
    S: MeetingEventStore,
    F: FailureLog,
{
    /// Shared webhook secret check.
    pub(crate) authenticator: WebhookAuthenticator,
    /// Derives per-group keys on each decrypt; no key outlives its request.
    pub(crate) key_ring: GroupKeyRing,
    /// Accepted outer grammars.
    pub(crate) formats: Vec<EnvelopeFormat>,
    /// Success-path store.
    pub(crate) event_store: S,
    /// Failure-path store.
    pub(crate) failure_log: F,
}

/// Dependencies for IngestService
pub struct IngestDependencies<S, F> {
    /// Meeting log written on success.
    pub event_store: S,
    /// Audit log written on every failure after authentication.
    pub failure_log: F,
}

impl<S, F> IngestService<S, F>
where
    S: MeetingEventStore,
    F: FailureLog,
{
    /// Build a service from validated configuration.
    pub fn new(
        config: &PipelineConfig,
        deps: IngestDependencies<S, F>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let key_ring = config.key_ring();
        info!(
            groups = key_ring.groups().len(),
            root_key_fallback = key_ring.root_fallback(),
            formats = ?config.envelope_formats,
            "Ingest pipeline configured"
        );

        Ok(Self {
            authenticator: WebhookAuthenticator::new(config.webhook_secret.clone()),
            key_ring,
            formats: config.envelope_formats.clone(),
            event_store: deps.event_store,
            failure_log: deps.failure_log,
        })
    }

    /// Success-path store.
    pub fn event_store(&self) -> &S {
        &self.event_store
    }

    /// Failure-path store.
    pub fn failure_log(&self) -> &F {
        &self.failure_log
    }

    async fn process(&self, request: &IngestRequest) -> IngestOutcome {
        let mut stage = PipelineStage::Unauthenticated;

        let secrets = [
            request.body_secret.as_deref(),
            request.header_secret.as_deref(),
        ];
        if let Err(err) = self.authenticator.verify(secrets) {
            warn!(reason = %err, "Webhook rejected");
            metric_inc!(PIPELINE_FAILURES, &["authenticate"]);
            return IngestOutcome::Forbidden(err);
        }
        stage.transition(PipelineStage::Authenticated);

        let message = &request.message;
        let entry = match self.prepare(message, &mut stage) {
            Ok(entry) => entry,
            Err(err) => return self.fail(message, err, stage, None).await,
        };

        match self.event_store.upsert_event(&entry).await {
            Ok(upsert) => {
                stage.transition(PipelineStage::Persisted);
                let event = entry.event;
                info!(
                    meeting_id = %event.meeting_id,
                    group_id = %event.group_id,
                    result = upsert.as_str(),
                    "Meeting SMS stored"
                );
                metric_inc!(EVENTS_PERSISTED, &[upsert.as_str()]);
                IngestOutcome::Stored { event, upsert }
            }
            Err(e) => {
                error!(error = %e, meeting_id = %entry.event.meeting_id, "Meeting log write failed");
                metric_inc!(EVENTS_PERSISTED, &["error"]);
                let meeting_id = entry.event.meeting_id;
                self.fail(message, e.into(), stage, Some(meeting_id)).await
            }
        }
    }

    /// Log, count, and audit a failure after authentication.
    ///
    /// `meeting_id` is set only for retryable failures, so redeliveries of the
    /// same meeting leave a single audit row.
    async fn fail(
        &self,
        message: &IncomingMessage,
        err: PipelineError,
        stage: PipelineStage,
        meeting_id: Option<String>,
    ) -> IngestOutcome {
        if let PipelineError::Decrypt(e) = &err {
            debug!(cause = e.cause().kind(), "Payload did not open");
        }
        warn!(
            from = %message.origin.from_number,
            stage = %stage,
            step = err.step(),
            reason = %err.reason(),
            retryable = err.is_retryable(),
            "Meeting SMS failed"
        );
        metric_inc!(PIPELINE_FAILURES, &[err.step()]);

        let mut record = FailureRecord::new(message, err.reason(), stage);
        record.meeting_id = meeting_id;
        self.record_failure(&record).await;
        IngestOutcome::Failed { error: err, stage }
    }

    /// Best-effort failure-log write. Errors are logged and counted, never
    /// returned.
    async fn record_failure(&self, record: &FailureRecord) {
        if let Err(e) = self.failure_log.append_failure(record).await {
            error!(error = %e, stage = %record.failed_stage, "Failure log write failed");
            metric_inc!(FAILURE_LOG_WRITE_ERRORS);
        }
    }
}

impl IngestService<InMemoryMeetingEventStore, InMemoryFailureLog> {
    /// Service over fresh in-memory stores.
    pub fn new_in_memory(config: &PipelineConfig) -> Result<Self, ConfigError> {
        Self::new(
            config,
            IngestDependencies {
                event_store: InMemoryMeetingEventStore::new(),
                failure_log: InMemoryFailureLog::new(),
            },
        )
    }
}

#[async_trait]
impl<S, F> IngestApi for IngestService<S, F>
where
    S: MeetingEventStore,
    F: FailureLog,
{
    #[instrument(skip_all, fields(to = %request.message.origin.to_number))]
    async fn ingest(&self, request: IngestRequest) -> IngestOutcome {
        let _timer = time_histogram!(PIPELINE_DURATION);
        let outcome = self.process(&request).await;
        metric_inc!(MESSAGES_RECEIVED, &[outcome.label()]);
        outcome
    }
}
