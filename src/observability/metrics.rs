//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by method, family, status
//! - `relay_request_duration_seconds` (histogram): time to response headers
//! - `relay_redirects_total` (counter): redirects by kind (rewritten, followed)
//! - `relay_blocked_total` (counter): allow-list rejections
//!
//! Recording without an installed exporter is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, family: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(
        "relay_requests_total",
        "method" => method.to_string(),
        "family" => family,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("relay_request_duration_seconds", "family" => family)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_redirect(kind: &'static str) {
    ::metrics::counter!("relay_redirects_total", "kind" => kind).increment(1);
}

pub fn record_blocked() {
    ::metrics::counter!("relay_blocked_total").increment(1);
}
