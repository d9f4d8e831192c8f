//! Metrics collection.
//!
//! # Metrics
//! - `wax_rpc_calls_total` (counter): calls by endpoint, call path, outcome
//! - `wax_broadcast_total` (counter): broadcast results by outcome
//! - `wax_broadcast_duration_seconds` (histogram): time from first push to result
//! - `wax_resolution_attempts` (histogram): endpoints tried before reference data resolved
//!
//! Only the `metrics` facade is used here; installing a recorder/exporter is
//! left to the embedding application.

use std::time::Instant;

/// Record one endpoint call.
pub fn record_rpc_call(endpoint: &str, call: &str, outcome: &str) {
    metrics::counter!(
        "wax_rpc_calls_total",
        "endpoint" => endpoint.to_string(),
        "call" => call.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record how many endpoints the resolver walked through.
pub fn record_resolution(attempts: usize, resolved: bool) {
    metrics::histogram!(
        "wax_resolution_attempts",
        "resolved" => if resolved { "true" } else { "false" }
    )
    .record(attempts as f64);
}

/// Record the result of one broadcast race.
pub fn record_broadcast(outcome: &'static str, started: Instant) {
    metrics::counter!("wax_broadcast_total", "outcome" => outcome).increment(1);
    metrics::histogram!("wax_broadcast_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}
