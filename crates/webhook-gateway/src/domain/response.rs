//! Outcome to HTTP response mapping.
//!
//! | Outcome | Status |
//! |---------|--------|
//! | Stored or duplicate | 200 |
//! | Sender not authenticated | 403, plain `Forbidden` |
//! | Format, decrypt, validation failure | 201 |
//! | Meeting log write failure | 503 |
//! | Deadline exceeded | 503 |
//!
//! The SMS gateway redelivers until it sees a 2xx. Data that can never
//! decode is answered 201 so it is audited once; anything a retry could fix
//! is answered 503.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use meeting_ingest::{IngestOutcome, IngestResponse};

/// Reason sent when the per-request deadline fires.
pub const TIMEOUT_REASON: &str = "Request timed out";

/// Status code for an outcome.
pub fn status_for(outcome: &IngestOutcome) -> StatusCode {
    match outcome {
        IngestOutcome::Stored { .. } => StatusCode::OK,
        IngestOutcome::Forbidden(_) => StatusCode::FORBIDDEN,
        IngestOutcome::Failed { error, .. } if error.is_retryable() => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        IngestOutcome::Failed { .. } => StatusCode::CREATED,
    }
}

/// Full HTTP response for an outcome.
pub fn outcome_response(outcome: &IngestOutcome) -> Response {
    let status = status_for(outcome);
    match outcome.response() {
        Some(body) => (status, Json(body)).into_response(),
        None => (status, "Forbidden").into_response(),
    }
}

/// Response when the pipeline did not finish in time.
pub fn timeout_response() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(IngestResponse::Failed {
            reason: TIMEOUT_REASON.to_string(),
        }),
    )
        .into_response()
}
