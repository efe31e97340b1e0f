//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_requests_total` (counter): requests by method, status, route
//! - `bridge_request_duration_seconds` (histogram): latency by method, route
//! - `bridge_dispatch_failures_total` (counter): pool failures by reason
//! - `bridge_worker_replies_total` (counter): replies by worker
//! - `bridge_pool_workers` (gauge): running workers
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed, so library code
//!   and tests record unconditionally
//! - Route label is the registration pattern, never the raw path, to keep
//!   label cardinality bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    counter!(
        "bridge_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    histogram!(
        "bridge_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_dispatch_failure(reason: &'static str) {
    counter!("bridge_dispatch_failures_total", "reason" => reason).increment(1);
}

pub fn record_worker_reply(worker_id: usize) {
    counter!("bridge_worker_replies_total", "worker" => worker_id.to_string()).increment(1);
}

pub fn set_pool_workers(count: usize) {
    gauge!("bridge_pool_workers").set(count as f64);
}
