//! HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use ingest_telemetry::{encode_metrics, metric_inc, MESSAGES_RECEIVED};
use meeting_ingest::IngestApi;
use tracing::{error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::request::WebhookRequest;
use crate::domain::response::{outcome_response, timeout_response};

/// Header that may carry the webhook secret instead of the body.
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Pipeline behind the webhook routes.
    pub ingest: Arc<dyn IngestApi>,
    /// Deadline for one pipeline invocation.
    pub request_timeout: Duration,
}

impl AppState {
    /// State over a pipeline and its per-request deadline.
    pub fn new(ingest: Arc<dyn IngestApi>, request_timeout: Duration) -> Self {
        Self {
            ingest,
            request_timeout,
        }
    }
}

/// Webhook endpoint. Runs one pipeline invocation under the request deadline.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("webhook", %request_id);

    async move {
        let header_secret = headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let request = WebhookRequest::from_body(&body).into_ingest_request(header_secret);

        match tokio::time::timeout(state.request_timeout, state.ingest.ingest(request)).await {
            Ok(outcome) => outcome_response(&outcome),
            Err(_) => {
                warn!(
                    timeout_ms = state.request_timeout.as_millis() as u64,
                    "Webhook deadline exceeded"
                );
                metric_inc!(MESSAGES_RECEIVED, &["timeout"]);
                timeout_response()
            }
        }
    }
    .instrument(span)
    .await
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "webhook-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus scrape endpoint
pub async fn metrics_handler() -> Response {
    match encode_metrics() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Metrics encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
