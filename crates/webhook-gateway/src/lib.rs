//! # Webhook Gateway
//!
//! HTTP entry point for encrypted meeting SMS.
//!
//! ## Routes
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | POST | `/`, `/webhook/sms` | Run one delivery through the ingest pipeline |
//! | GET | `/health` | Liveness |
//! | GET | `/metrics` | Prometheus exposition |
//!
//! ## Middleware Stack
//!
//! ```text
//! Request → Trace → BodyLimit → Handler (deadline) → IngestService
//! ```

pub mod domain;
pub mod handlers;
pub mod service;

pub use domain::config::{ConfigError, GatewayConfig, StorageBackend};
pub use domain::error::GatewayError;
pub use domain::request::WebhookRequest;
pub use handlers::{AppState, WEBHOOK_SECRET_HEADER};
pub use service::{build_ingest, build_router, serve};
