//! Prometheus metrics for monitoring the iFlow proxy server.
//!
//! Metrics are registered once in the default registry and exposed at `/metrics`.

use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter_vec, GaugeVec, HistogramVec,
    IntCounterVec,
};
use std::sync::OnceLock;

/// Container for all application metrics.
pub struct Metrics {
    /// Total number of requests by method, endpoint, model, and status
    pub request_count: IntCounterVec,

    /// Request duration histogram in seconds (time to response headers)
    pub request_duration: HistogramVec,

    /// Number of currently active requests by endpoint
    pub active_requests: GaugeVec,

    /// Upstream latency until response headers, by upstream model
    pub upstream_latency: HistogramVec,

    /// Upstream failures by upstream model and category
    pub upstream_errors: IntCounterVec,

    /// Token usage reported in non-streaming upstream responses
    pub token_usage: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Initialize the metrics registry.
///
/// Safe to call more than once; later calls return the same instance.
pub fn init_metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let request_count = register_int_counter_vec!(
            "iflow_proxy_requests_total",
            "Total number of requests",
            &["method", "endpoint", "model", "status_code"]
        )
        .expect("Failed to register request_count metric");

        let request_duration = register_histogram_vec!(
            "iflow_proxy_request_duration_seconds",
            "Request duration in seconds",
            &["method", "endpoint", "model"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]
        )
        .expect("Failed to register request_duration metric");

        let active_requests = register_gauge_vec!(
            "iflow_proxy_active_requests",
            "Number of active requests",
            &["endpoint"]
        )
        .expect("Failed to register active_requests metric");

        let upstream_latency = register_histogram_vec!(
            "iflow_proxy_upstream_latency_seconds",
            "Upstream response latency in seconds",
            &["model"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]
        )
        .expect("Failed to register upstream_latency metric");

        let upstream_errors = register_int_counter_vec!(
            "iflow_proxy_upstream_errors_total",
            "Total number of failed upstream calls",
            &["model", "category"]
        )
        .expect("Failed to register upstream_errors metric");

        let token_usage = register_int_counter_vec!(
            "iflow_proxy_tokens_total",
            "Total number of tokens used",
            &["model", "token_type"]
        )
        .expect("Failed to register token_usage metric");

        Metrics {
            request_count,
            request_duration,
            active_requests,
            upstream_latency,
            upstream_errors,
            token_usage,
        }
    })
}

/// Get the global metrics instance, initializing it on first use.
pub fn get_metrics() -> &'static Metrics {
    init_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_metrics_is_idempotent() {
        let first = init_metrics() as *const Metrics;
        let second = init_metrics() as *const Metrics;
        assert_eq!(first, second);
    }

    #[test]
    fn test_upstream_error_counter() {
        let metrics = get_metrics();
        let counter = metrics
            .upstream_errors
            .with_label_values(&["metrics-test-model", "upstream_4xx"]);
        let before = counter.get();
        counter.inc();
        assert_eq!(counter.get(), before + 1);
    }

    #[test]
    fn test_metrics_are_gathered() {
        let metrics = init_metrics();
        metrics
            .token_usage
            .with_label_values(&["gather-test-model", "total"])
            .inc_by(3);

        let names: Vec<String> = prometheus::gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"iflow_proxy_tokens_total".to_string()));
    }
}
