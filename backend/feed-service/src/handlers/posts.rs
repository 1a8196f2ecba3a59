use actix_web::{web, HttpResponse};
use tracing::info;
use uuid::Uuid;

use super::PostHandlerState;
use crate::db::NewPost;
use crate::error::{AppError, Result};
use crate::metrics::feed::POSTS_CREATED_TOTAL;
use crate::middleware::UserId;
use crate::models::{CreatePostRequest, CreatePostResponse};

/// Geotags the post when coordinates are present, then stores it.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    tag = "posts",
    params(
        ("x-user-id" = Uuid, Header, description = "Author id propagated by the gateway")
    ),
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = CreatePostResponse),
        (status = 400, description = "Invalid body or coordinates"),
        (status = 401, description = "Missing or invalid x-user-id"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn create_post(
    user: UserId,
    body: web::Json<CreatePostRequest>,
    state: web::Data<PostHandlerState>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    req.validate().map_err(AppError::BadRequest)?;

    let location = state
        .geotagger
        .tag(req.latitude, req.longitude, req.location_name)
        .await?;
    let geotagged = location.geo_cell.is_some();

    let post_id = state
        .writer
        .create_post(NewPost {
            author_id: user.0,
            image_url: req.image_url,
            caption: req.caption,
            location,
        })
        .await?;

    POSTS_CREATED_TOTAL
        .with_label_values(&[if geotagged { "true" } else { "false" }])
        .inc();
    info!(user_id = %user.0, post_id = %post_id, geotagged, "Post created");

    Ok(HttpResponse::Created().json(CreatePostResponse { post_id }))
}
