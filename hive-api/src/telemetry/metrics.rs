//! Prometheus Metrics Definitions
//!
//! Defines all hive metrics with their labels and exposes them at `/metrics`.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, register_int_counter,
    CounterVec, Encoder, Gauge, HistogramVec, IntCounter, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance, registered on first use.
pub static METRICS: Lazy<ApiResult<HiveMetrics>> = Lazy::new(HiveMetrics::new);

/// Container for all hive metrics.
#[derive(Clone)]
pub struct HiveMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Currently open SSE status streams
    pub sse_subscribers: Gauge,

    /// Change notifications published by resource packages (heartbeats excluded)
    pub change_events_published_total: IntCounter,
}

impl HiveMetrics {
    /// Create and register all metrics with the default Prometheus registry.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "hive_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| registration_error("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "hive_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("http_request_duration_seconds", e))?,

            sse_subscribers: register_gauge!(
                "hive_sse_subscribers",
                "Current number of open SSE status streams"
            )
            .map_err(|e| registration_error("sse_subscribers", e))?,

            change_events_published_total: register_int_counter!(
                "hive_change_events_published_total",
                "Total change notifications published by resource packages"
            )
            .map_err(|e| registration_error("change_events_published_total", e))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status_str.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    pub fn record_change_published(&self) {
        self.change_events_published_total.inc();
    }
}

fn registration_error(name: &str, err: prometheus::Error) -> ApiError {
    ApiError::internal_error(format!("Failed to register {}: {}", name, err))
}

/// Keeps `hive_sse_subscribers` raised while alive.
#[derive(Debug)]
pub struct SubscriberGauge(());

impl SubscriberGauge {
    pub fn acquire() -> Self {
        if let Ok(metrics) = METRICS.as_ref() {
            metrics.sse_subscribers.inc();
        }
        SubscriberGauge(())
    }
}

impl Drop for SubscriberGauge {
    fn drop(&mut self) {
        if let Ok(metrics) = METRICS.as_ref() {
            metrics.sse_subscribers.dec();
        }
    }
}

/// Handler for GET /metrics.
///
/// Returns Prometheus text format metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    // Touch the registry so hive metrics appear even before the first request.
    if let Err(err) = METRICS.as_ref() {
        tracing::error!(error = %err.message, "Metrics unavailable");
    }

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::core::Collector;

    #[test]
    fn test_metrics_creation() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        assert!(!metrics.http_requests_total.desc().is_empty());
        Ok(())
    }

    #[test]
    fn test_record_http_request() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        metrics.record_http_request("GET", "/links/:key", 200, 0.015);
        let count = metrics
            .http_requests_total
            .with_label_values(&["GET", "/links/:key", "200"])
            .get();
        assert!(count >= 1.0);
        Ok(())
    }

    #[test]
    fn test_change_events_counter() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        let before = metrics.change_events_published_total.get();
        metrics.record_change_published();
        assert!(metrics.change_events_published_total.get() > before);
        Ok(())
    }
}
