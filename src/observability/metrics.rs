//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ingest_http_requests_total` (counter): requests by method, route, status
//! - `ingest_http_request_duration_seconds` (histogram): latency by method, route
//! - `ingest_records_received_total` (counter): receive outcomes
//!   (`inserted`, `replaced`, `rejected`)
//! - `ingest_store_records` (gauge): records currently held

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a completed HTTP request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let route = route.to_string();
    counter!(
        "ingest_http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "ingest_http_request_duration_seconds",
        "method" => method,
        "route" => route
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of a receive.
pub fn record_ingest(outcome: &'static str) {
    counter!("ingest_records_received_total", "outcome" => outcome).increment(1);
}

/// Record the current store size.
pub fn record_store_size(len: usize) {
    gauge!("ingest_store_records").set(len as f64);
}

/// Middleware timing every request against its route template.
///
/// Unmatched paths are grouped under one label to keep cardinality bounded.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(method.as_str(), &route, response.status().as_u16(), start);
    response
}
