//! # HTTP Flows
//!
//! The gateway router in front of a real pipeline, driven with
//! `tower::ServiceExt::oneshot`.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use meeting_ingest::{
        IngestApi, IngestDependencies, IngestService, InMemoryFailureLog, MeetingEventStore,
        MeetingLogEntry, PersistenceError, UpsertOutcome,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use webhook_gateway::{build_router, AppState, WEBHOOK_SECRET_HEADER};

    use crate::fixtures::{
        compact_config, memory_pipeline, MemoryPipeline, KNOWN_PAYLOAD, KNOWN_PLAINTEXT,
        WEBHOOK_SECRET,
    };

    fn router(pipeline: Arc<MemoryPipeline>) -> Router {
        build_router(AppState::new(pipeline, Duration::from_secs(5)), 64 * 1024)
    }

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook/sms")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_gateway_shaped_delivery_is_stored() {
        let pipeline = memory_pipeline();
        let body = json!({
            "event": "sms.received",
            "secret": WEBHOOK_SECRET,
            "message": format!("ds:{}", KNOWN_PAYLOAD),
            "from": "+254711000111",
            "to_number": "+254700000999",
            "phone": {"country": "KE", "network": "Safaricom"}
        });

        let response = router(Arc::clone(&pipeline))
            .oneshot(post_json(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["meeting"], "M100");
        assert_eq!(json["decryptedMessage"], KNOWN_PLAINTEXT);

        let row = pipeline.event_store().get("M100").unwrap();
        assert_eq!(row.origin.from_number, "+254711000111");
        assert_eq!(row.origin.country, "KE");
    }

    #[tokio::test]
    async fn test_redelivery_over_http_is_ok_twice() {
        let pipeline = memory_pipeline();
        let body = json!({"secret": WEBHOOK_SECRET, "content": format!("ds:{}", KNOWN_PAYLOAD)});

        for _ in 0..3 {
            let response = router(Arc::clone(&pipeline))
                .oneshot(post_json(body.clone()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(pipeline.event_store().len(), 1);
    }

    #[tokio::test]
    async fn test_body_secret_takes_precedence_over_header() {
        let pipeline = memory_pipeline();
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(WEBHOOK_SECRET_HEADER, WEBHOOK_SECRET)
            .body(Body::from(
                json!({"secret": "stale", "content": format!("ds:{}", KNOWN_PAYLOAD)}).to_string(),
            ))
            .unwrap();

        let response = router(Arc::clone(&pipeline)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(pipeline.event_store().is_empty());
        assert!(pipeline.failure_log().is_empty());
    }

    #[tokio::test]
    async fn test_missing_secret_is_forbidden() {
        let pipeline = memory_pipeline();

        let response = router(Arc::clone(&pipeline))
            .oneshot(post_json(json!({"content": format!("ds:{}", KNOWN_PAYLOAD)})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Forbidden");
    }

    #[tokio::test]
    async fn test_tampered_payload_is_created_and_audited() {
        let pipeline = memory_pipeline();
        let tampered = KNOWN_PAYLOAD.replacen("8qme", "8qmf", 1);
        assert_ne!(tampered, KNOWN_PAYLOAD);

        let response = router(Arc::clone(&pipeline))
            .oneshot(post_json(json!({
                "secret": WEBHOOK_SECRET,
                "content": format!("ds:{}", tampered),
                "from_number": "+254700000001"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = read_json(response).await;
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "Decryption failed: invalid encrypted payload");

        let records = pipeline.failure_log().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].from_number, "+254700000001");
        assert_eq!(records[0].to_number, "unknown");
    }

    struct DownStore;

    #[async_trait]
    impl MeetingEventStore for DownStore {
        async fn upsert_event(
            &self,
            _entry: &MeetingLogEntry,
        ) -> Result<UpsertOutcome, PersistenceError> {
            Err(PersistenceError::Unavailable("pool timed out".into()))
        }
    }

    #[tokio::test]
    async fn test_store_outage_asks_for_redelivery() {
        let pipeline = Arc::new(
            IngestService::new(
                &compact_config(),
                IngestDependencies {
                    event_store: DownStore,
                    failure_log: InMemoryFailureLog::new(),
                },
            )
            .unwrap(),
        );
        let ingest: Arc<dyn IngestApi> = pipeline.clone();
        let app = build_router(AppState::new(ingest, Duration::from_secs(5)), 64 * 1024);

        let body = json!({
            "secret": WEBHOOK_SECRET,
            "content": format!("ds:{}", KNOWN_PAYLOAD)
        });

        for _ in 0..3 {
            let response = app.clone().oneshot(post_json(body.clone())).await.unwrap();
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
            let json = read_json(response).await;
            assert_eq!(json["reason"], "Failed to store meeting event");
        }

        // Each redelivery during the outage reuses the one audit row
        assert_eq!(pipeline.failure_log().len(), 1);
    }
}
