//! # Tamper Audit
//!
//! Altered, forged, or cross-group payloads must never reach the meeting log,
//! and each one must leave an audit row naming where it stopped.

#[cfg(test)]
mod tests {
    use crate::fixtures::{authed, memory_pipeline, seal, KNOWN_PAYLOAD, SHARED_SECRET};
    use meeting_ingest::{IngestApi, IngestOutcome, PipelineError, PipelineStage, ValidationError};
    use proptest::prelude::*;
    use shared_crypto::{derive_group_key, encrypt_payload, SharedSecret};

    const BASE64_ALPHABET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    fn swap_char(payload: &str, index: usize, pick: usize) -> String {
        let mut bytes = payload.as_bytes().to_vec();
        let original = bytes[index];
        let replacement = BASE64_ALPHABET
            .iter()
            .copied()
            .cycle()
            .skip(pick)
            .find(|c| *c != original)
            .unwrap();
        bytes[index] = replacement;
        String::from_utf8(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_cross_group_claim_is_rejected() {
        let pipeline = memory_pipeline();
        // Opens under GROUP1's key but claims GROUP2
        let body = format!("ds:{}", seal("GROUP1", "GROUP2,M1,130,1700000000"));

        let outcome = pipeline.ingest(authed(body.clone())).await;

        match outcome {
            IngestOutcome::Failed { error, stage } => {
                assert_eq!(
                    error,
                    PipelineError::Validation(ValidationError::GroupMismatch)
                );
                assert_eq!(stage, PipelineStage::Decrypted);
            }
            other => panic!("unexpected outcome {}", other.label()),
        }

        let records = pipeline.failure_log().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reason, "Tampered group number");
        assert_eq!(records[0].raw_message, body);
        assert!(pipeline.event_store().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_group_does_not_open() {
        let pipeline = memory_pipeline();
        let body = format!("ds:{}", seal("GROUP9", "GROUP9,M1,130,1700000000"));

        let outcome = pipeline.ingest(authed(body)).await;

        assert!(matches!(
            outcome,
            IngestOutcome::Failed {
                error: PipelineError::Decrypt(_),
                stage: PipelineStage::OuterParsed,
            }
        ));
        assert!(pipeline.event_store().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_shared_secret_does_not_open() {
        let pipeline = memory_pipeline();
        let key = derive_group_key(&SharedSecret::from("someone-else"), "GROUP1");
        let payload = encrypt_payload(b"GROUP1,M1,130,1700000000", &key).unwrap();
        assert_ne!(SHARED_SECRET, "someone-else");

        let outcome = pipeline.ingest(authed(format!("ds:{}", payload))).await;

        assert_eq!(outcome.label(), "failed");
        assert_eq!(
            pipeline.failure_log().records()[0].reason,
            "Decryption failed: invalid encrypted payload"
        );
    }

    #[tokio::test]
    async fn test_truncated_payload_is_audited() {
        let pipeline = memory_pipeline();
        let truncated = &KNOWN_PAYLOAD[..KNOWN_PAYLOAD.len() - 4];

        let outcome = pipeline.ingest(authed(format!("ds:{}", truncated))).await;

        assert_eq!(outcome.label(), "failed");
        let records = pipeline.failure_log().records();
        assert_eq!(records[0].failed_stage, PipelineStage::OuterParsed);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_any_altered_character_is_rejected(
            index in 0..KNOWN_PAYLOAD.len(),
            pick in 0..BASE64_ALPHABET.len(),
        ) {
            let altered = swap_char(KNOWN_PAYLOAD, index, pick);
            prop_assert_ne!(&altered, KNOWN_PAYLOAD);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let pipeline = memory_pipeline();
            let outcome = runtime.block_on(pipeline.ingest(authed(format!("ds:{}", altered))));

            let is_decrypt_failure = matches!(
                outcome,
                IngestOutcome::Failed { error: PipelineError::Decrypt(_), .. }
            );
            prop_assert!(is_decrypt_failure);
            prop_assert!(pipeline.event_store().is_empty());
            prop_assert_eq!(pipeline.failure_log().len(), 1);
        }
    }
}
