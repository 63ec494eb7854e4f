//! # Pipeline Flows
//!
//! End-to-end runs of `IngestService` over in-memory stores, starting from a
//! payload sealed by an independent AES-GCM implementation.

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        authed, compact_config, memory_pipeline, seal, KNOWN_PAYLOAD, KNOWN_PLAINTEXT,
    };
    use meeting_ingest::{
        EnvelopeFormat, IngestApi, IngestOutcome, IngestResponse, IngestService, PipelineConfig,
        PipelineStage, UpsertOutcome,
    };

    // =========================================================================
    // KNOWN-ANSWER SCENARIO
    // =========================================================================

    #[tokio::test]
    async fn test_known_payload_end_to_end() {
        let pipeline = memory_pipeline();

        let outcome = pipeline
            .ingest(authed(format!("ds:{}", KNOWN_PAYLOAD)))
            .await;

        let IngestOutcome::Stored { event, upsert } = &outcome else {
            panic!("expected stored");
        };
        assert_eq!(*upsert, UpsertOutcome::Inserted);
        assert_eq!(event.group_id, "GROUP1");
        assert_eq!(event.meeting_id, "M100");
        assert_eq!(event.version, "1.3.0");
        assert_eq!(
            event.meeting_time.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
        assert_eq!(event.encrypted_payload, KNOWN_PAYLOAD);
        assert!(event.was_encrypted);

        assert_eq!(
            outcome.response(),
            Some(IngestResponse::Ok {
                group: "GROUP1".into(),
                meeting: "M100".into(),
                decrypted_message: KNOWN_PLAINTEXT.into(),
            })
        );

        let store = pipeline.event_store();
        assert_eq!(store.len(), 1);
        let row = store.get("M100").expect("row keyed by meeting id");
        assert_eq!(row.raw_message, format!("ds:{}", KNOWN_PAYLOAD));
        assert_eq!(row.origin.country, "KE");
        assert!(pipeline.failure_log().is_empty());
    }

    #[tokio::test]
    async fn test_known_payload_with_surrounding_whitespace() {
        let pipeline = memory_pipeline();

        let outcome = pipeline
            .ingest(authed(format!("  Ds :\n{}  \r\n", KNOWN_PAYLOAD)))
            .await;

        assert_eq!(outcome.label(), "stored");
    }

    // =========================================================================
    // DATA-QUALITY FAILURES
    // =========================================================================

    #[tokio::test]
    async fn test_each_failure_class_audited_once() {
        let pipeline = memory_pipeline();
        let bodies = [
            ("".to_string(), PipelineStage::Authenticated),
            ("no delimiter".to_string(), PipelineStage::Authenticated),
            ("sms:abc".to_string(), PipelineStage::Authenticated),
            ("ds:".to_string(), PipelineStage::Authenticated),
            ("ds:%%%not-base64%%%".to_string(), PipelineStage::OuterParsed),
            ("ds:AAAA".to_string(), PipelineStage::OuterParsed),
            (
                format!("ds:{}", seal("GROUP1", "GROUP1,M1,130,1,extra")),
                PipelineStage::Decrypted,
            ),
            (
                format!("ds:{}", seal("GROUP1", "GROUP1,,130,1")),
                PipelineStage::Decrypted,
            ),
        ];

        for (body, expected_stage) in &bodies {
            let outcome = pipeline.ingest(authed(body.clone())).await;
            match outcome {
                IngestOutcome::Failed { error, stage } => {
                    assert_eq!(stage, *expected_stage, "body {:?}", body);
                    assert!(!error.is_retryable());
                }
                other => panic!("body {:?} gave {:?}", body, other.label()),
            }
        }

        let records = pipeline.failure_log().records();
        assert_eq!(records.len(), bodies.len());
        assert!(pipeline.event_store().is_empty());
        assert!(records.iter().all(|r| r.from_number == "+254700000001"));
    }

    #[tokio::test]
    async fn test_short_reason_never_leaks_internals() {
        let pipeline = memory_pipeline();

        let outcome = pipeline.ingest(authed("ds:AAAA")).await;

        let Some(IngestResponse::Failed { reason }) = outcome.response() else {
            panic!("expected failed body");
        };
        assert_eq!(reason, "Decryption failed: invalid encrypted payload");
    }

    // =========================================================================
    // ENVELOPE FORMATS
    // =========================================================================

    #[tokio::test]
    async fn test_both_formats_share_one_store() {
        let config = PipelineConfig {
            envelope_formats: vec![EnvelopeFormat::Compact, EnvelopeFormat::Addressed],
            ..compact_config()
        };
        let pipeline = IngestService::new_in_memory(&config).unwrap();

        let compact = format!("ds:{}", KNOWN_PAYLOAD);
        let addressed = format!(
            "dreamstart:GROUP2:M200:{}",
            seal("GROUP2", "GROUP2,M200,2105,1700000300")
        );

        assert_eq!(pipeline.ingest(authed(compact)).await.label(), "stored");
        assert_eq!(pipeline.ingest(authed(addressed)).await.label(), "stored");

        assert_eq!(pipeline.event_store().len(), 2);
        assert_eq!(pipeline.event_store().get("M200").unwrap().event.version, "2.10.5");
    }

    #[tokio::test]
    async fn test_addressed_disabled_by_default() {
        let pipeline = memory_pipeline();
        let addressed = format!(
            "dreamstart:GROUP1:M100:{}",
            seal("GROUP1", KNOWN_PLAINTEXT)
        );

        let outcome = pipeline.ingest(authed(addressed)).await;

        let Some(IngestResponse::Failed { reason }) = outcome.response() else {
            panic!("expected failed body");
        };
        assert_eq!(reason, "Invalid tag: expected 'DS'");
    }
}
