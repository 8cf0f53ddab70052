//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all PeerForge metrics
pub const METRICS_PREFIX: &str = "peerforge";

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Workflow metrics
    describe_counter!(
        format!("{}_users_registered_total", METRICS_PREFIX),
        Unit::Count,
        "Total users registered"
    );

    describe_counter!(
        format!("{}_papers_submitted_total", METRICS_PREFIX),
        Unit::Count,
        "Total papers submitted"
    );

    describe_counter!(
        format!("{}_reviewers_assigned_total", METRICS_PREFIX),
        Unit::Count,
        "Total reviewer assignments"
    );

    describe_counter!(
        format!("{}_reviews_submitted_total", METRICS_PREFIX),
        Unit::Count,
        "Total reviews submitted"
    );

    // Storage metrics
    describe_counter!(
        format!("{}_persist_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Total failed collection writes"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record a completed registration
pub fn record_registration(role: &str) {
    counter!(
        format!("{}_users_registered_total", METRICS_PREFIX),
        "role" => role.to_string()
    )
    .increment(1);
}

/// Record a paper submission
pub fn record_submission() {
    counter!(format!("{}_papers_submitted_total", METRICS_PREFIX)).increment(1);
}

/// Record a reviewer assignment
pub fn record_assignment() {
    counter!(format!("{}_reviewers_assigned_total", METRICS_PREFIX)).increment(1);
}

/// Record a submitted review
pub fn record_review() {
    counter!(format!("{}_reviews_submitted_total", METRICS_PREFIX)).increment(1);
}

/// Record a failed collection write
pub fn record_persist_failure(store: &str) {
    counter!(
        format!("{}_persist_failures_total", METRICS_PREFIX),
        "store" => store.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/v1/papers");
        std::thread::sleep(std::time::Duration::from_millis(10));
        metrics.finish(200);
        // Just verify it runs without panic
    }

    #[test]
    fn test_domain_counters_do_not_panic() {
        record_registration("Student");
        record_submission();
        record_assignment();
        record_review();
        record_persist_failure("papers");
    }
}
