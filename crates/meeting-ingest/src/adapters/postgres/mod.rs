//! PostgreSQL adapters over a `deadpool-postgres` pool.

mod client;
mod event_store;
mod failure_log;

pub use client::{PostgresClient, PostgresSettings};
pub use event_store::PostgresMeetingEventStore;
pub use failure_log::PostgresFailureLog;
