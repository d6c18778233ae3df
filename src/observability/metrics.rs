//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guard_decisions_total` (counter): pipeline decisions by `decision`
//! - `guard_events_total` (counter): analytics events by `event`
//! - `relay_requests_total` (counter): relay responses by `outcome`
//! - `relay_delivery_duration_seconds` (histogram): messaging API latency by `result`
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics recorder"),
    }
}

pub fn record_guard_decision(decision: &'static str) {
    counter!("guard_decisions_total", "decision" => decision).increment(1);
}

pub fn record_guard_event(event: &'static str) {
    counter!("guard_events_total", "event" => event).increment(1);
}

pub fn record_relay_request(outcome: &'static str) {
    counter!("relay_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_delivery(start: Instant, delivered: bool) {
    let result = if delivered { "ok" } else { "error" };
    histogram!("relay_delivery_duration_seconds", "result" => result)
        .record(start.elapsed().as_secs_f64());
}
