//! Prometheus counters for retrieval and request observability

use std::time::Duration;

use prometheus::register_histogram_vec_with_registry;
use prometheus::register_int_counter_vec_with_registry;
use prometheus::Encoder;
use prometheus::HistogramVec;
use prometheus::IntCounterVec;
use prometheus::Registry;
use prometheus::TextEncoder;
use prometheus::DEFAULT_BUCKETS;

use crate::errors::CopilotError;
use crate::errors::Result;

/// Content type of the text exposition format
pub const EXPOSITION_CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Metric families owned by one registry, so each service instance
/// reports only its own traffic
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    search_sources: IntCounterVec,
    request_latency: HistogramVec,
}

impl Metrics {
    /// # Errors
    /// - `CopilotError::Metrics` when a metric family fails to register
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        // COUNTER
        let search_sources = register_int_counter_vec_with_registry!(
            "opscopilot_search_sources_total",
            "Number of retrieved sources by index.",
            &["index"],
            registry
        )?;

        // HISTOGRAM
        let request_latency = register_histogram_vec_with_registry!(
            "opscopilot_request_latency_seconds",
            "Request latency in seconds.",
            &["path", "method", "status"],
            DEFAULT_BUCKETS.to_vec(),
            registry
        )?;

        Ok(Self {
            registry,
            search_sources,
            request_latency,
        })
    }

    /// Count one retrieved source from `index`
    pub fn record_source(&self, index: &str) {
        self.search_sources.with_label_values(&[index]).inc();
    }

    pub fn source_count(&self, index: &str) -> u64 {
        self.search_sources.with_label_values(&[index]).get()
    }

    pub fn record_request(&self, method: &str, path: &str, status: u16, latency: Duration) {
        self.request_latency
            .with_label_values(&[path, method, &status.to_string()])
            .observe(latency.as_secs_f64());
    }

    /// Render every family in the text exposition format
    ///
    /// # Errors
    /// - `CopilotError::Metrics` when encoding fails
    pub fn encode(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| CopilotError::Custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_counter_per_index() {
        let metrics = Metrics::new().unwrap();
        metrics.record_source("tickets");
        metrics.record_source("tickets");
        metrics.record_source("policies");

        assert_eq!(metrics.source_count("tickets"), 2);
        assert_eq!(metrics.source_count("policies"), 1);
        assert_eq!(metrics.source_count("missing"), 0);
    }

    #[test]
    fn test_exposition_format() {
        let metrics = Metrics::new().unwrap();
        metrics.record_source("knowledge-base");
        metrics.record_request("POST", "/chat/completions", 200, Duration::from_millis(30));
        metrics.record_request("POST", "/chat/completions", 200, Duration::from_millis(10));

        let text = metrics.encode().unwrap();

        assert!(text.contains("# TYPE opscopilot_search_sources_total counter"));
        assert!(text.contains(r#"opscopilot_search_sources_total{index="knowledge-base"} 1"#));
        assert!(text.contains("# TYPE opscopilot_request_latency_seconds histogram"));
        assert!(text.contains(
            r#"opscopilot_request_latency_seconds_count{method="POST",path="/chat/completions",status="200"} 2"#
        ));
    }

    #[test]
    fn test_instances_are_isolated() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();
        first.record_source("tickets");

        assert_eq!(first.source_count("tickets"), 1);
        assert_eq!(second.source_count("tickets"), 0);
    }
}
