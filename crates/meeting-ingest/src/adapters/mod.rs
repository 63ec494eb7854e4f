//! # Adapters
//!
//! Implementations of the outbound ports.
//!
//! - `memory` - `DashMap`/mutex backed, for tests and `STORAGE_BACKEND=memory`
//! - `postgres` - production tables `sms_meeting_log` and `sms_failed_decrypt_log`

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryFailureLog, InMemoryMeetingEventStore};
pub use postgres::{PostgresClient, PostgresFailureLog, PostgresMeetingEventStore, PostgresSettings};
