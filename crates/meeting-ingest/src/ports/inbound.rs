//! # Inbound Port (Driving Port)
//!
//! The single operation the webhook gateway drives, plus its request and
//! outcome types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{IncomingMessage, NormalizedEvent, PipelineStage, UpsertOutcome};
use crate::domain::errors::{AuthError, PipelineError};

/// One webhook delivery as seen by the pipeline.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// Message text and sender metadata.
    pub message: IncomingMessage,
    /// Secret carried in the request body.
    pub body_secret: Option<String>,
    /// Secret carried in the `x-webhook-secret` header.
    pub header_secret: Option<String>,
}

/// Terminal state of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Event durably recorded (now or by an earlier delivery).
    Stored {
        /// The persisted event.
        event: NormalizedEvent,
        /// Whether this delivery wrote the row.
        upsert: UpsertOutcome,
    },

    /// Sender not authenticated. Nothing was logged.
    Forbidden(AuthError),

    /// Failed after authentication. A failure record was attempted.
    Failed {
        /// What went wrong.
        error: PipelineError,
        /// Last state reached.
        stage: PipelineStage,
    },
}

impl IngestOutcome {
    /// JSON body for the sender; `None` for an auth rejection.
    pub fn response(&self) -> Option<IngestResponse> {
        match self {
            IngestOutcome::Stored { event, .. } => Some(IngestResponse::Ok {
                group: event.group_id.clone(),
                meeting: event.meeting_id.clone(),
                decrypted_message: event.decrypted_message.clone(),
            }),
            IngestOutcome::Forbidden(_) => None,
            IngestOutcome::Failed { error, .. } => Some(IngestResponse::Failed {
                reason: error.reason(),
            }),
        }
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            IngestOutcome::Stored {
                upsert: UpsertOutcome::Inserted,
                ..
            } => "stored",
            IngestOutcome::Stored {
                upsert: UpsertOutcome::Duplicate,
                ..
            } => "duplicate",
            IngestOutcome::Forbidden(_) => "forbidden",
            IngestOutcome::Failed { .. } => "failed",
        }
    }
}

/// Response body contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IngestResponse {
    /// `{status:"ok", group, meeting, decryptedMessage}`
    Ok {
        /// Group id.
        group: String,
        /// Meeting id.
        meeting: String,
        /// Decrypted CSV record.
        #[serde(rename = "decryptedMessage")]
        decrypted_message: String,
    },

    /// `{status:"failed", reason}`
    Failed {
        /// Short user-visible reason.
        reason: String,
    },
}

/// Primary API of the ingest pipeline.
#[async_trait]
pub trait IngestApi: Send + Sync {
    /// Run one delivery through authentication, decoding, and persistence.
    ///
    /// Never returns an error: every failure is folded into the outcome.
    async fn ingest(&self, request: IngestRequest) -> IngestOutcome;
}
