//! Metrics collection and exposition.
//!
//! # Metrics
//! - `contact_submissions_total` (counter): submissions by outcome
//! - `contact_rate_limited_total` (counter): refused admit checks
//! - `contact_suspicious_inputs_total` (counter): advisory pattern hits by field
//! - `contact_rate_limit_entries` (gauge): identifiers currently tracked
//! - `contact_rate_limit_swept_total` (counter): entries removed by sweeps

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus exporter"),
    }
}

pub fn record_submission(outcome: &'static str) {
    counter!("contact_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limited() {
    counter!("contact_rate_limited_total").increment(1);
}

pub fn record_suspicious_input(field: &'static str) {
    counter!("contact_suspicious_inputs_total", "field" => field).increment(1);
}

pub fn record_rate_limit_entries(count: usize) {
    gauge!("contact_rate_limit_entries").set(count as f64);
}

pub fn record_rate_limit_swept(count: usize) {
    counter!("contact_rate_limit_swept_total").increment(count as u64);
}
