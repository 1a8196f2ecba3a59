use actix_web::{web, HttpResponse};
use feed_ranking::{FeedQuery, NearbyQuery, PostSummary, RankedPage};
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

use super::FeedHandlerState;
use crate::error::{AppError, Result};
use crate::metrics::feed::{
    outcome_label, FEED_PAGE_SIZE, FEED_REQUEST_DURATION_SECONDS, FEED_REQUEST_TOTAL,
};
use crate::middleware::UserId;
use crate::models::PostsResponse;

fn record_outcome(endpoint: &str, start: Instant, result: &Result<RankedPage<PostSummary>>) {
    FEED_REQUEST_DURATION_SECONDS
        .with_label_values(&[endpoint])
        .observe(start.elapsed().as_secs_f64());
    FEED_REQUEST_TOTAL
        .with_label_values(&[endpoint, outcome_label(result)])
        .inc();
    if let Ok(page) = result {
        FEED_PAGE_SIZE
            .with_label_values(&[endpoint])
            .observe(page.items.len() as f64);
    }
}

/// Home feed: followed authors first, then everyone else, newest first within each group.
#[utoipa::path(
    get,
    path = "/api/v1/posts/feed",
    tag = "posts",
    params(
        ("x-user-id" = Uuid, Header, description = "Viewer id propagated by the gateway"),
        ("offset" = Option<i64>, Query, description = "Items to skip (default 0)"),
        ("limit" = Option<i64>, Query, description = "Page size, 1..=50 (default 10)")
    ),
    responses(
        (status = 200, description = "Feed page", body = PostsResponse),
        (status = 400, description = "Invalid paging parameters"),
        (status = 401, description = "Missing or invalid x-user-id"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn get_feed(
    user: UserId,
    query: web::Query<FeedQuery>,
    state: web::Data<FeedHandlerState>,
) -> Result<HttpResponse> {
    let start = Instant::now();
    let result = state
        .engine
        .home_feed(user.0, &query)
        .await
        .map_err(AppError::from);
    record_outcome("feed", start, &result);

    let page = result?;
    debug!(
        user_id = %user.0,
        offset = query.offset,
        returned = page.items.len(),
        is_end = page.is_end,
        "Served home feed"
    );
    Ok(HttpResponse::Ok().json(PostsResponse::from(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/geographic-nearby",
    tag = "posts",
    params(
        ("x-user-id" = Uuid, Header, description = "Viewer id propagated by the gateway"),
        ("latitude" = f64, Query, description = "Viewer latitude, -90..=90"),
        ("longitude" = f64, Query, description = "Viewer longitude, -180..=180"),
        ("zoom" = Option<i64>, Query, description = "Map zoom, 1..=18 (default 5)"),
        ("following_only" = Option<bool>, Query, description = "Only followed authors"),
        ("limit" = Option<i64>, Query, description = "Page size, 1..=50 (default 20)")
    ),
    responses(
        (status = 200, description = "Nearby posts, best first", body = PostsResponse),
        (status = 400, description = "Invalid coordinates, zoom or limit"),
        (status = 401, description = "Missing or invalid x-user-id"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn get_nearby(
    user: UserId,
    query: web::Query<NearbyQuery>,
    state: web::Data<FeedHandlerState>,
) -> Result<HttpResponse> {
    let start = Instant::now();
    let result = state
        .engine
        .nearby_posts(user.0, &query)
        .await
        .map_err(AppError::from);
    record_outcome("nearby", start, &result);

    let page = result?;
    debug!(
        user_id = %user.0,
        zoom = query.zoom,
        following_only = query.following_only,
        returned = page.items.len(),
        "Served nearby posts"
    );
    Ok(HttpResponse::Ok().json(PostsResponse::from(page)))
}
