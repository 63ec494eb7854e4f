//! # Outbound Ports (Driven Ports)
//!
//! Storage the pipeline writes to.
//!
//! Production: `PostgresMeetingEventStore`, `PostgresFailureLog`
//! Testing: `InMemoryMeetingEventStore`, `InMemoryFailureLog`

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::{FailureRecord, MeetingLogEntry, UpsertOutcome};
use crate::domain::errors::PersistenceError;

/// Idempotent store of successfully decoded meeting events.
#[async_trait]
pub trait MeetingEventStore: Send + Sync {
    /// Insert `entry` unless a row with the same meeting id exists.
    ///
    /// ## Idempotency
    ///
    /// Concurrent or repeated calls for one meeting id yield exactly one
    /// `Inserted`; every other call returns `Duplicate`. A uniqueness
    /// conflict is never an error.
    async fn upsert_event(&self, entry: &MeetingLogEntry)
        -> Result<UpsertOutcome, PersistenceError>;
}

/// Append-only audit log of messages that could not be stored.
#[async_trait]
pub trait FailureLog: Send + Sync {
    /// Append one record. Callers treat errors as best-effort.
    async fn append_failure(&self, record: &FailureRecord) -> Result<(), PersistenceError>;
}

#[async_trait]
impl<T: MeetingEventStore + ?Sized> MeetingEventStore for Arc<T> {
    async fn upsert_event(
        &self,
        entry: &MeetingLogEntry,
    ) -> Result<UpsertOutcome, PersistenceError> {
        (**self).upsert_event(entry).await
    }
}

#[async_trait]
impl<T: FailureLog + ?Sized> FailureLog for Arc<T> {
    async fn append_failure(&self, record: &FailureRecord) -> Result<(), PersistenceError> {
        (**self).append_failure(record).await
    }
}
