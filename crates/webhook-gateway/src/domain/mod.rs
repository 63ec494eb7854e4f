//! Gateway configuration, errors, and wire models.

pub mod config;
pub mod error;
pub mod request;
pub mod response;
