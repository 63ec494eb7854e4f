//! # Ports Layer
//!
//! - `inbound.rs` - Driving port (what the webhook gateway calls)
//! - `outbound.rs` - Driven ports (storage the pipeline writes to)

pub mod inbound;
pub mod outbound;
