//! # Meeting-SMS Ingest Test Suite
//!
//! Unified test crate for scenarios that span crates.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Known-answer payloads, configs, sealing helpers
//! └── integration/      # Pipeline and HTTP scenarios
//!     ├── pipeline_flows.rs
//!     ├── duplicate_delivery.rs
//!     ├── tamper_audit.rs
//!     └── http_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ingest-tests
//! cargo test -p ingest-tests integration::duplicate_delivery
//! ```

pub mod fixtures;
pub mod integration;
