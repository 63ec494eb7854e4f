//! Cross-crate scenarios.

mod duplicate_delivery;
mod http_flows;
mod pipeline_flows;
mod tamper_audit;
