//! Prometheus metrics for the ingest pipeline.
//!
//! All metrics follow the naming convention: `sms_ingest_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., messages_total)
//! - **Histogram**: Distribution of values (e.g., pipeline_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // INBOUND
    // =========================================================================

    /// Webhook deliveries by final outcome
    pub static ref MESSAGES_RECEIVED: CounterVec = CounterVec::new(
        Opts::new("sms_ingest_messages_total", "Webhook deliveries by outcome"),
        &["outcome"]  // outcome: stored/duplicate/forbidden/failed/timeout
    ).expect("metric creation failed");

    /// End-to-end pipeline duration
    pub static ref PIPELINE_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "sms_ingest_pipeline_duration_seconds",
            "Time spent processing one webhook delivery"
        ).buckets(exponential_buckets(0.0005, 2.0, 14).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // PIPELINE FAILURES
    // =========================================================================

    /// Failures by the stage they occurred in
    pub static ref PIPELINE_FAILURES: CounterVec = CounterVec::new(
        Opts::new("sms_ingest_failures_total", "Pipeline failures by stage"),
        &["stage"]  // stage: authenticate/outer_parse/decrypt/inner_parse/persist
    ).expect("metric creation failed");

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Success-path writes by result
    pub static ref EVENTS_PERSISTED: CounterVec = CounterVec::new(
        Opts::new("sms_ingest_events_persisted_total", "Meeting log upserts by result"),
        &["result"]  // result: inserted/duplicate/error
    ).expect("metric creation failed");

    /// Failure-log writes that were dropped
    pub static ref FAILURE_LOG_WRITE_ERRORS: Counter = Counter::new(
        "sms_ingest_failure_log_write_errors_total",
        "Failure-log inserts that could not be persisted"
    ).expect("metric creation failed");
}

/// Handle for the metrics registry
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; metrics already registered are kept.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(MESSAGES_RECEIVED.clone()),
        Box::new(PIPELINE_DURATION.clone()),
        Box::new(PIPELINE_FAILURES.clone()),
        Box::new(EVENTS_PERSISTED.clone()),
        Box::new(FAILURE_LOG_WRITE_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
