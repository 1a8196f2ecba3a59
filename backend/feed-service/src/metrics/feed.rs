use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

lazy_static! {
    /// Duration of ranking requests by endpoint (feed, nearby).
    pub static ref FEED_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "feed_request_duration_seconds",
        "Ranking request duration segmented by endpoint",
        &["endpoint"]
    )
    .expect("failed to register feed_request_duration_seconds");

    /// Ranking requests by endpoint and outcome (ok, client_error, unavailable, error).
    pub static ref FEED_REQUEST_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feed_request_total",
        "Total ranking requests segmented by endpoint and outcome",
        &["endpoint", "outcome"]
    )
    .expect("failed to register feed_request_total");

    /// Items returned per page.
    pub static ref FEED_PAGE_SIZE: HistogramVec = register_histogram_vec!(
        "feed_page_size",
        "Number of posts returned per page segmented by endpoint",
        &["endpoint"],
        vec![0.0, 1.0, 5.0, 10.0, 20.0, 30.0, 50.0]
    )
    .expect("failed to register feed_page_size");

    /// Posts created, split by whether they carried coordinates.
    pub static ref POSTS_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feed_posts_created_total",
        "Posts created segmented by geotagging",
        &["geotagged"]
    )
    .expect("failed to register feed_posts_created_total");

    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feed_http_requests_total",
        "HTTP requests segmented by method, route and status",
        &["method", "path", "status"]
    )
    .expect("failed to register feed_http_requests_total");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "feed_http_request_duration_seconds",
        "HTTP request duration segmented by method and route",
        &["method", "path"]
    )
    .expect("failed to register feed_http_request_duration_seconds");
}

/// Outcome label for a finished ranking request
pub fn outcome_label<T>(result: &crate::error::Result<T>) -> &'static str {
    use crate::error::AppError;

    match result {
        Ok(_) => "ok",
        Err(AppError::BadRequest(_)) | Err(AppError::Unauthorized(_)) => "client_error",
        Err(AppError::ServiceUnavailable(_)) => "unavailable",
        Err(_) => "error",
    }
}
