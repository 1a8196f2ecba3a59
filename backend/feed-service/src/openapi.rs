/// OpenAPI documentation for Nova Feed Service
use feed_ranking::{AuthorSummary, LocationSummary, PostSummary};
use utoipa::OpenApi;

use crate::models::{CreatePostRequest, CreatePostResponse, PostsResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nova Feed Service API",
        description = "Home feed ranking, geographic discovery of nearby posts and geotagged post creation. The viewer is identified by the gateway-propagated x-user-id header.",
        license(name = "MIT")
    ),
    paths(
        crate::handlers::feed::get_feed,
        crate::handlers::feed::get_nearby,
        crate::handlers::posts::create_post
    ),
    components(schemas(
        PostsResponse,
        PostSummary,
        AuthorSummary,
        LocationSummary,
        CreatePostRequest,
        CreatePostResponse
    )),
    tags(
        (name = "posts", description = "Feed, nearby discovery and post creation")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_lists_post_routes() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "Nova Feed Service API");
        for path in [
            "/api/v1/posts/feed",
            "/api/v1/posts/geographic-nearby",
            "/api/v1/posts",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }

        let schemas = &doc.components.as_ref().unwrap().schemas;
        assert!(schemas.contains_key("PostsResponse"));
        assert!(schemas.contains_key("PostSummary"));
    }
}
