//! # Duplicate Delivery
//!
//! Gateways retry. The same SMS may arrive many times, sequentially or at
//! once, and must leave exactly one meeting row behind.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::fixtures::{authed, memory_pipeline, seal, KNOWN_PAYLOAD};
    use meeting_ingest::{IngestApi, IngestOutcome, IngestResponse, UpsertOutcome};

    #[tokio::test]
    async fn test_redelivery_answers_ok_without_second_row() {
        let pipeline = memory_pipeline();
        let body = format!("ds:{}", KNOWN_PAYLOAD);

        let first = pipeline.ingest(authed(body.clone())).await;
        let second = pipeline.ingest(authed(body)).await;

        assert_eq!(first.label(), "stored");
        assert_eq!(second.label(), "duplicate");
        // The sender cannot tell a retry from a first delivery
        assert_eq!(first.response(), second.response());
        assert_eq!(pipeline.event_store().len(), 1);
    }

    #[tokio::test]
    async fn test_first_write_wins_for_reused_meeting_id() {
        let pipeline = memory_pipeline();
        let original = format!("ds:{}", seal("GROUP1", "GROUP1,M7,130,1700000000"));
        let rewrite = format!("ds:{}", seal("GROUP1", "GROUP1,M7,999,1800000000"));

        pipeline.ingest(authed(original)).await;
        let outcome = pipeline.ingest(authed(rewrite)).await;

        assert_eq!(outcome.label(), "duplicate");
        let row = pipeline.event_store().get("M7").unwrap();
        assert_eq!(row.event.version, "1.3.0");
        assert_eq!(row.event.timestamp_raw, "1700000000");
    }

    #[tokio::test]
    async fn test_reencrypted_copy_is_still_a_duplicate() {
        let pipeline = memory_pipeline();
        // Fresh nonce each time, so the ciphertexts differ
        let first = format!("ds:{}", seal("GROUP2", "GROUP2,M9,130,1700000000"));
        let second = format!("ds:{}", seal("GROUP2", "GROUP2,M9,130,1700000000"));
        assert_ne!(first, second);

        pipeline.ingest(authed(first)).await;
        let outcome = pipeline.ingest(authed(second)).await;

        assert_eq!(outcome.label(), "duplicate");
        assert_eq!(pipeline.event_store().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_burst_stores_once() {
        let pipeline = memory_pipeline();
        let body = format!("ds:{}", KNOWN_PAYLOAD);

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let pipeline = Arc::clone(&pipeline);
                let body = body.clone();
                tokio::spawn(async move { pipeline.ingest(authed(body)).await })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                IngestOutcome::Stored { upsert, .. } => {
                    if upsert == UpsertOutcome::Inserted {
                        inserted += 1;
                    }
                }
                other => panic!("unexpected outcome {}", other.label()),
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(pipeline.event_store().len(), 1);
        assert!(pipeline.failure_log().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_distinct_meetings_all_stored() {
        let pipeline = memory_pipeline();

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let pipeline = Arc::clone(&pipeline);
                let body = format!(
                    "ds:{}",
                    seal("GROUP1", &format!("GROUP1,M{},130,1700000000", i))
                );
                tokio::spawn(async move { pipeline.ingest(authed(body)).await })
            })
            .collect();

        for handle in handles {
            let outcome = handle.await.unwrap();
            assert!(matches!(
                outcome.response(),
                Some(IngestResponse::Ok { .. })
            ));
        }

        assert_eq!(pipeline.event_store().len(), 32);
    }
}
