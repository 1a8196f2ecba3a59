//! Prometheus metrics for feed-service.
//!
//! Exposes feed-specific collectors and an HTTP handler for the `/metrics` endpoint.

use actix_web::HttpResponse;
use prometheus::{Encoder, TextEncoder};
use std::time::Duration;

pub mod feed;

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

/// Record one HTTP request against its route pattern
pub fn observe_http_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    let status = status.to_string();
    feed::HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status])
        .inc();
    feed::HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(elapsed.as_secs_f64());
}
