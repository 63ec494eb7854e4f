//! Inbound webhook body as posted by the SMS gateway.

use meeting_ingest::{IncomingMessage, IngestRequest, MessageOrigin};
use serde::Deserialize;

/// JSON webhook body. Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookRequest {
    /// Shared webhook secret
    pub secret: Option<String>,
    /// Message text
    pub content: Option<String>,
    /// Message text under its alternate name
    pub message: Option<String>,
    /// Sender number
    pub from_number: Option<String>,
    /// Sender number under its alternate name
    pub from: Option<String>,
    /// Receiving number
    pub to_number: Option<String>,
    /// Sender phone details
    pub phone: Option<PhoneDetails>,
}

/// Nested `phone` object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhoneDetails {
    /// Country of the sending network
    pub country: Option<String>,
}

impl WebhookRequest {
    /// Parse a body, treating anything that is not a JSON object of the
    /// expected shape as an empty request.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "Webhook body not usable JSON, treating as empty");
                Self::default()
            }
        }
    }

    /// Convert into a pipeline request. `header_secret` comes from
    /// `x-webhook-secret`.
    pub fn into_ingest_request(self, header_secret: Option<String>) -> IngestRequest {
        let body = first_present(self.content, self.message).unwrap_or_default();
        let origin = MessageOrigin::new(
            first_present(self.from_number, self.from),
            self.to_number,
            self.phone.and_then(|p| p.country),
        );

        IngestRequest {
            message: IncomingMessage::new(body, origin),
            body_secret: self.secret,
            header_secret,
        }
    }
}

fn first_present(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary.filter(|v| !v.is_empty()).or(fallback)
}
