//! Metrics collection and exposition.
//!
//! # Metrics
//! - `devhost_route_decisions_total` (counter): routing outcomes by `kind`
//! - `devhost_request_duration_seconds` (histogram): proxied request latency by `status`

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::RouteDecision;

/// Start the Prometheus exporter on `addr`. Requires a running Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter"),
    }
}

/// Count one routing decision.
pub fn record_route(decision: &RouteDecision<'_>) {
    counter!("devhost_route_decisions_total", "kind" => decision.kind()).increment(1);
}

/// Record the latency of one proxied request.
pub fn record_request(status: u16, start: Instant) {
    histogram!("devhost_request_duration_seconds", "status" => status.to_string())
        .record(start.elapsed().as_secs_f64());
}
