/// HTTP surface tests against an in-memory store
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use feed_ranking::geohash::{encode, POST_PRECISION};
use feed_ranking::place::{FixedPlaceNameResolver, DEFAULT_LOCATION};
use feed_ranking::store::InMemoryFeedStore;
use feed_ranking::{
    Candidate, CandidateQuery, EngineConfig, FeedEngine, FeedStore, GeoTagger, StoreError,
};
use feed_service::db::{NewPost, PostWriter};
use feed_service::handlers::{configure_routes, FeedHandlerState, PostHandlerState};
use feed_service::middleware::USER_ID_HEADER;
use mockall::mock;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const SF: (f64, f64) = (37.7749, -122.4194);

#[derive(Default)]
struct RecordingWriter {
    posts: Mutex<Vec<NewPost>>,
}

#[async_trait]
impl PostWriter for RecordingWriter {
    async fn create_post(&self, post: NewPost) -> Result<Uuid, StoreError> {
        self.posts.lock().unwrap().push(post);
        Ok(Uuid::new_v4())
    }
}

mock! {
    pub Store {}

    #[async_trait]
    impl FeedStore for Store {
        async fn candidates_by_geo_prefixes(&self, query: &CandidateQuery) -> Result<Vec<Candidate>, StoreError>;
        async fn following_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>, StoreError>;
        async fn liked_post_ids(&self, user_id: Uuid, post_ids: &[Uuid]) -> Result<HashSet<Uuid>, StoreError>;
        async fn home_feed_page(&self, following_ids: &HashSet<Uuid>, offset: usize, limit: usize) -> Result<Vec<Candidate>, StoreError>;
    }
}

fn post(author_id: Uuid, created_at: DateTime<Utc>, latitude: f64, longitude: f64) -> Candidate {
    Candidate {
        post_id: Uuid::new_v4(),
        author_id,
        created_at,
        latitude: Some(latitude),
        longitude: Some(longitude),
        likes_count: 0,
        comments_count: 0,
        geo_cell: encode(latitude, longitude, POST_PRECISION).ok(),
        image_url: "https://cdn.nova.dev/posts/p.jpg".to_string(),
        caption: None,
        location_name: Some("San Francisco".to_string()),
        author_username: "author".to_string(),
        author_avatar_url: None,
    }
}

async fn call(
    store: Arc<dyn FeedStore>,
    writer: Arc<RecordingWriter>,
    req: test::TestRequest,
) -> ServiceResponse {
    let engine = FeedEngine::new(store, EngineConfig::default()).unwrap();
    let feed_state = web::Data::new(FeedHandlerState {
        engine: Arc::new(engine),
    });
    let post_state = web::Data::new(PostHandlerState {
        geotagger: Arc::new(GeoTagger::new(Arc::new(FixedPlaceNameResolver::default()))),
        writer,
    });

    let app = test::init_service(
        App::new()
            .app_data(feed_state)
            .app_data(post_state)
            .configure(configure_routes),
    )
    .await;
    test::call_service(&app, req.to_request()).await
}

fn get_as(viewer: Uuid, uri: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .insert_header((USER_ID_HEADER, viewer.to_string()))
}

#[actix_web::test]
async fn test_feed_puts_followed_authors_first() {
    let viewer = Uuid::new_v4();
    let friend = Uuid::new_v4();
    let now = Utc::now();
    let friend_post = post(friend, now - Duration::hours(5), SF.0, SF.1);
    let store = InMemoryFeedStore::new()
        .with_post(post(Uuid::new_v4(), now, SF.0, SF.1))
        .with_post(friend_post.clone())
        .with_post(post(Uuid::new_v4(), now - Duration::minutes(1), SF.0, SF.1))
        .with_follow(viewer, friend)
        .with_like(viewer, friend_post.post_id);

    let resp = call(
        Arc::new(store),
        Arc::default(),
        get_as(viewer, "/api/v1/posts/feed?limit=2"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let posts = body["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(body["isEnd"], json!(false));
    assert_eq!(posts[0]["post_id"], json!(friend_post.post_id));
    assert_eq!(posts[0]["is_liked"], json!(true));
    assert_eq!(posts[0]["user"]["is_following"], json!(true));
    assert_eq!(posts[1]["user"]["is_following"], json!(false));
}

#[actix_web::test]
async fn test_feed_past_the_end_is_empty() {
    let store = InMemoryFeedStore::new().with_post(post(Uuid::new_v4(), Utc::now(), SF.0, SF.1));

    let resp = call(
        Arc::new(store),
        Arc::default(),
        get_as(Uuid::new_v4(), "/api/v1/posts/feed?offset=10"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"posts": [], "isEnd": true}));
}

#[actix_web::test]
async fn test_feed_rejects_oversized_limit() {
    let resp = call(
        Arc::new(InMemoryFeedStore::new()),
        Arc::default(),
        get_as(Uuid::new_v4(), "/api/v1/posts/feed?limit=51"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], json!(400));
}

#[actix_web::test]
async fn test_missing_viewer_header_is_unauthorized() {
    let req = test::TestRequest::get().uri("/api/v1/posts/feed");
    let resp = call(Arc::new(InMemoryFeedStore::new()), Arc::default(), req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_nearby_returns_local_posts_only() {
    let now = Utc::now();
    let local = post(Uuid::new_v4(), now, SF.0 + 0.001, SF.1);
    let store = InMemoryFeedStore::new()
        .with_post(local.clone())
        .with_post(post(Uuid::new_v4(), now, 51.5074, -0.1278));

    let uri = format!(
        "/api/v1/posts/geographic-nearby?latitude={}&longitude={}&zoom=10",
        SF.0, SF.1
    );
    let resp = call(Arc::new(store), Arc::default(), get_as(Uuid::new_v4(), &uri)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let posts = body["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["post_id"], json!(local.post_id));
    assert_eq!(posts[0]["location"]["name"], json!("San Francisco"));
    assert_eq!(body["isEnd"], json!(true));
}

#[actix_web::test]
async fn test_nearby_following_only_without_followees() {
    let store = InMemoryFeedStore::new().with_post(post(Uuid::new_v4(), Utc::now(), SF.0, SF.1));
    let uri = format!(
        "/api/v1/posts/geographic-nearby?latitude={}&longitude={}&following_only=true",
        SF.0, SF.1
    );

    let resp = call(Arc::new(store), Arc::default(), get_as(Uuid::new_v4(), &uri)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"posts": [], "isEnd": true}));
}

#[actix_web::test]
async fn test_nearby_rejects_invalid_input() {
    let viewer = Uuid::new_v4();
    for uri in [
        "/api/v1/posts/geographic-nearby?latitude=95&longitude=0",
        "/api/v1/posts/geographic-nearby?latitude=0&longitude=-180.5",
        "/api/v1/posts/geographic-nearby?latitude=0&longitude=0&zoom=0",
        "/api/v1/posts/geographic-nearby?latitude=0&longitude=0&zoom=19",
        "/api/v1/posts/geographic-nearby?latitude=north&longitude=0",
        "/api/v1/posts/geographic-nearby?longitude=0",
    ] {
        let resp = call(
            Arc::new(InMemoryFeedStore::new()),
            Arc::default(),
            get_as(viewer, uri),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[actix_web::test]
async fn test_store_outage_is_service_unavailable() {
    let mut store = MockStore::new();
    store
        .expect_following_ids()
        .returning(|_| Err(StoreError::Timeout("following_ids".to_string())));

    let resp = call(
        Arc::new(store),
        Arc::default(),
        get_as(Uuid::new_v4(), "/api/v1/posts/feed"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], json!(503));
}

#[actix_web::test]
async fn test_create_post_geotags_coordinates() {
    let author = Uuid::new_v4();
    let writer = Arc::new(RecordingWriter::default());
    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header((USER_ID_HEADER, author.to_string()))
        .set_json(json!({
            "image_url": "https://cdn.nova.dev/posts/new.jpg",
            "caption": "golden hour",
            "location_name": "somewhere else",
            "latitude": SF.0,
            "longitude": SF.1
        }));

    let resp = call(Arc::new(InMemoryFeedStore::new()), writer.clone(), req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["post_id"].is_string());

    let posts = writer.posts.lock().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].author_id, author);
    assert_eq!(
        posts[0].location.geo_cell.as_ref().map(|c| c.as_str()),
        Some("9q8yyk8y")
    );
    assert_eq!(posts[0].location.location_name.as_deref(), Some(DEFAULT_LOCATION));
}

#[actix_web::test]
async fn test_create_post_without_coordinates_keeps_name() {
    let writer = Arc::new(RecordingWriter::default());
    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header((USER_ID_HEADER, Uuid::new_v4().to_string()))
        .set_json(json!({
            "image_url": "https://cdn.nova.dev/posts/new.jpg",
            "location_name": "Home"
        }));

    let resp = call(Arc::new(InMemoryFeedStore::new()), writer.clone(), req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let posts = writer.posts.lock().unwrap();
    assert!(posts[0].location.geo_cell.is_none());
    assert_eq!(posts[0].location.location_name.as_deref(), Some("Home"));
}

#[actix_web::test]
async fn test_create_post_rejects_bad_bodies() {
    let writer = Arc::new(RecordingWriter::default());
    for body in [
        json!({"image_url": "https://cdn.nova.dev/p.jpg", "latitude": 10.0}),
        json!({"image_url": "", "latitude": 10.0, "longitude": 10.0}),
        json!({"image_url": "https://cdn.nova.dev/p.jpg", "latitude": 91.0, "longitude": 0.0}),
        json!({"caption": "no image"}),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/posts")
            .insert_header((USER_ID_HEADER, Uuid::new_v4().to_string()))
            .set_json(&body);
        let resp = call(Arc::new(InMemoryFeedStore::new()), writer.clone(), req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", body);
    }
    assert!(writer.posts.lock().unwrap().is_empty());
}
