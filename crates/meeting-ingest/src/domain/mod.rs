//! # Domain Layer
//!
//! Pure pipeline logic. No I/O.
//!
//! ## Modules
//!
//! - `auth` - Shared webhook secret verification
//! - `entities` - Messages, events, failure records, pipeline states
//! - `envelope` - Outer `tag:payload` grammar
//! - `record` - Inner four-field CSV grammar
//! - `version` - Version dotting and meeting time parsing
//! - `errors` - Domain error types

pub mod auth;
pub mod entities;
pub mod envelope;
pub mod errors;
pub mod record;
pub mod version;
