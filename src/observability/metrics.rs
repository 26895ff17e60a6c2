//! Metrics collection and exposition.
//!
//! # Metrics
//! - `eti_calls_total` (counter): calls by method and outcome
//! - `eti_faults_total` (counter): escalations by code
//! - `eti_call_duration_seconds` (histogram): parse-to-response latency
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished call.
pub fn record_call(method: &str, outcome: &'static str, start: Instant) {
    counter!("eti_calls_total", "method" => method.to_string(), "outcome" => outcome).increment(1);
    histogram!("eti_call_duration_seconds", "outcome" => outcome).record(start.elapsed().as_secs_f64());
}

/// Record one escalation.
pub fn record_fault(code: Option<u16>) {
    let code = code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string());
    counter!("eti_faults_total", "code" => code).increment(1);
}
