//! Metrics collection.
//!
//! # Metrics
//! - `transport_requests_total` (counter): completed requests by transport, status
//! - `transport_timeouts_total` (counter): cancellations that fired, by transport
//! - `transport_outstanding_requests` (gauge): requests currently in flight

/// Record a completed request.
pub fn record_request(transport: &'static str, status: i32) {
    metrics::counter!(
        "transport_requests_total",
        "transport" => transport,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a timeout or external cancellation that fired.
pub fn record_timeout(transport: &'static str) {
    metrics::counter!("transport_timeouts_total", "transport" => transport).increment(1);
}

/// Update the outstanding request gauge.
pub fn record_outstanding(count: u64) {
    metrics::gauge!("transport_outstanding_requests").set(count as f64);
}
