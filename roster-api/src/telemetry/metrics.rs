//! Prometheus Metrics Definitions
//!
//! Defines all roster metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, CounterVec, Encoder,
    HistogramVec, IntCounter, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<RosterMetrics>> = Lazy::new(RosterMetrics::new);

/// Container for all roster metrics.
#[derive(Clone)]
pub struct RosterMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Snapshot lookups - labels: outcome (hit/miss/unavailable)
    pub cache_lookups_total: CounterVec,

    /// Snapshot writes - labels: status (success/failure)
    pub cache_writes_total: CounterVec,

    /// Finished import jobs - labels: status (succeeded/failed)
    pub import_jobs_total: CounterVec,

    /// Rows committed by import jobs
    pub import_rows_total: IntCounter,
}

impl RosterMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "roster_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| registration_failed("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "roster_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_failed("http_request_duration_seconds", e))?,

            cache_lookups_total: register_counter_vec!(
                "roster_cache_lookups_total",
                "Employee snapshot lookups by outcome",
                &["outcome"]
            )
            .map_err(|e| registration_failed("cache_lookups_total", e))?,

            cache_writes_total: register_counter_vec!(
                "roster_cache_writes_total",
                "Employee snapshot writes by status",
                &["status"]
            )
            .map_err(|e| registration_failed("cache_writes_total", e))?,

            import_jobs_total: register_counter_vec!(
                "roster_import_jobs_total",
                "Finished spreadsheet import jobs by status",
                &["status"]
            )
            .map_err(|e| registration_failed("import_jobs_total", e))?,

            import_rows_total: register_int_counter!(
                "roster_import_rows_total",
                "Rows committed by spreadsheet imports"
            )
            .map_err(|e| registration_failed("import_rows_total", e))?,
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

    /// Record a snapshot lookup outcome.
    pub fn record_cache_lookup(&self, outcome: &str) {
        self.cache_lookups_total.with_label_values(&[outcome]).inc();
    }

    /// Record a snapshot write.
    pub fn record_cache_write(&self, success: bool) {
        let status = if success { "success" } else { "failure" };
        self.cache_writes_total.with_label_values(&[status]).inc();
    }

    /// Record a finished import job.
    pub fn record_import_job(&self, status: &str, rows_committed: usize) {
        self.import_jobs_total.with_label_values(&[status]).inc();
        self.import_rows_total.inc_by(rows_committed as u64);
    }
}

fn registration_failed(name: &str, err: prometheus::Error) -> ApiError {
    ApiError::internal_error(format!("Failed to register {}: {}", name, err))
}

/// Run `f` against the global metrics, skipping silently if registration
/// failed at startup.
pub fn with_metrics(f: impl FnOnce(&RosterMetrics)) {
    if let Ok(metrics) = METRICS.as_ref() {
        f(metrics);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    // Make sure the roster collectors exist even before the first request.
    Lazy::force(&METRICS);

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
