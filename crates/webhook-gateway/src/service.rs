//! # Webhook Gateway Service
//!
//! Wires configuration, storage, and the ingest pipeline behind an axum
//! router, then serves until the shutdown future resolves.

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use meeting_ingest::{
    IngestApi, IngestDependencies, IngestService, PostgresClient, PostgresFailureLog,
    PostgresMeetingEventStore,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::domain::config::{GatewayConfig, StorageBackend};
use crate::domain::error::GatewayError;
use crate::handlers::{handle_webhook, health_check, metrics_handler, AppState};

/// Build the HTTP router.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(max_body_bytes));

    Router::new()
        .route("/", post(handle_webhook))
        .route("/webhook/sms", post(handle_webhook))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(middleware)
        .with_state(state)
}

/// Construct the pipeline over the configured backend.
///
/// For PostgreSQL the schema is applied before the first request is served.
pub async fn build_ingest(config: &GatewayConfig) -> Result<Arc<dyn IngestApi>, GatewayError> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; events are lost on restart");
            let service = IngestService::new_in_memory(&config.pipeline)?;
            Ok(Arc::new(service))
        }
        StorageBackend::Postgres => {
            let settings = &config.storage.postgres;
            info!(host = %settings.host, port = settings.port, database = %settings.database, "Connecting to PostgreSQL");

            let client = PostgresClient::new(settings)
                .map_err(|e| GatewayError::Storage(e.to_string()))?;
            client
                .ensure_schema()
                .await
                .map_err(|e| GatewayError::Storage(e.to_string()))?;

            let service = IngestService::new(
                &config.pipeline,
                IngestDependencies {
                    event_store: PostgresMeetingEventStore::new(client.clone()),
                    failure_log: PostgresFailureLog::new(client),
                },
            )?;
            Ok(Arc::new(service))
        }
    }
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<S>(config: GatewayConfig, shutdown: S) -> Result<(), GatewayError>
where
    S: Future<Output = ()> + Send + 'static,
{
    let ingest = build_ingest(&config).await?;
    let state = AppState::new(ingest, config.limits.request_timeout);
    let router = build_router(state, config.limits.max_body_bytes);

    let addr = config.http_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Webhook gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Webhook gateway stopped");
    Ok(())
}
