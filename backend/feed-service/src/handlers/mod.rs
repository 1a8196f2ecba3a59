/// HTTP request handlers
///
/// All routes live under `/api/v1/posts` and identify the viewer through the
/// `x-user-id` header.
pub mod feed;
pub mod posts;

use actix_web::{error::JsonPayloadError, error::QueryPayloadError, web, HttpRequest};
use feed_ranking::{FeedEngine, GeoTagger};
use std::sync::Arc;

use crate::db::PostWriter;
use crate::error::AppError;

pub use feed::{get_feed, get_nearby};
pub use posts::create_post;

pub struct FeedHandlerState {
    pub engine: Arc<FeedEngine>,
}

pub struct PostHandlerState {
    pub geotagger: Arc<GeoTagger>,
    pub writer: Arc<dyn PostWriter>,
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Register the post routes. Handler state is supplied by the caller as `web::Data`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/posts")
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .route("/feed", web::get().to(get_feed))
            .route("/geographic-nearby", web::get().to(get_nearby))
            .route("", web::post().to(create_post)),
    );
}
