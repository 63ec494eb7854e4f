//! In-memory adapters for tests and local runs.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::domain::entities::{FailureRecord, MeetingLogEntry, UpsertOutcome};
use crate::domain::errors::PersistenceError;
use crate::ports::outbound::{FailureLog, MeetingEventStore};

/// Meeting log keyed by meeting id.
///
/// Insert-if-absent goes through the `DashMap` entry API, which holds the
/// shard lock across the check and the insert.
#[derive(Debug, Default)]
pub struct InMemoryMeetingEventStore {
    rows: DashMap<String, MeetingLogEntry>,
}

impl InMemoryMeetingEventStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored row for `meeting_id`.
    pub fn get(&self, meeting_id: &str) -> Option<MeetingLogEntry> {
        self.rows.get(meeting_id).map(|r| r.value().clone())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl MeetingEventStore for InMemoryMeetingEventStore {
    async fn upsert_event(
        &self,
        entry: &MeetingLogEntry,
    ) -> Result<UpsertOutcome, PersistenceError> {
        match self.rows.entry(entry.event.meeting_id.clone()) {
            Entry::Occupied(_) => Ok(UpsertOutcome::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(entry.clone());
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}

/// Append-only failure log, keeping one row per `meeting_id` when set.
#[derive(Debug, Default)]
pub struct InMemoryFailureLog {
    records: Mutex<Vec<FailureRecord>>,
}

impl InMemoryFailureLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records in append order.
    pub fn records(&self) -> Vec<FailureRecord> {
        self.records.lock().clone()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// True when nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl FailureLog for InMemoryFailureLog {
    async fn append_failure(&self, record: &FailureRecord) -> Result<(), PersistenceError> {
        let mut records = self.records.lock();
        let seen = record.meeting_id.is_some()
            && records.iter().any(|r| r.meeting_id == record.meeting_id);
        if !seen {
            records.push(record.clone());
        }
        Ok(())
    }
}
