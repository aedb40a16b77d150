//! Client metrics.
//!
//! # Metrics
//! - `client_requests_total` (counter): completed requests by method, status
//! - `client_request_duration_seconds` (histogram): latency including retries
//! - `client_retries_total` (counter): retries by method and reason
//! - `client_pages_fetched_total` (counter): list pages fetched
//!
//! Status `0` means no HTTP status was received (network or local failure).

use std::time::Instant;

use metrics::{counter, histogram};

/// Record a finished request (all attempts included).
pub fn record_request(method: &'static str, status: u16, started: Instant) {
    counter!("client_requests_total", "method" => method, "status" => status.to_string())
        .increment(1);
    histogram!("client_request_duration_seconds", "method" => method)
        .record(started.elapsed().as_secs_f64());
}

/// Record one retry. `reason` is the status code or `"network"`.
pub fn record_retry(method: &'static str, reason: String) {
    counter!("client_retries_total", "method" => method, "reason" => reason).increment(1);
}

pub fn record_page_fetched() {
    counter!("client_pages_fetched_total").increment(1);
}
