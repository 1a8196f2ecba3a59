use feed_ranking::{PostSummary, RankedPage};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Page of posts returned by the feed and nearby endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostsResponse {
    pub posts: Vec<PostSummary>,
    #[serde(rename = "isEnd")]
    pub is_end: bool,
}

impl From<RankedPage<PostSummary>> for PostsResponse {
    fn from(page: RankedPage<PostSummary>) -> Self {
        Self {
            posts: page.items,
            is_end: page.is_end,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub image_url: String,
    pub caption: Option<String>,
    /// Replaced by the resolved place name when coordinates are given
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.image_url.trim().is_empty() {
            return Err("image_url must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePostResponse {
    pub post_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posts_response_keys() {
        let body = serde_json::to_value(PostsResponse::from(RankedPage::empty())).unwrap();
        assert_eq!(body["posts"], serde_json::json!([]));
        assert_eq!(body["isEnd"], serde_json::json!(true));
    }

    #[test]
    fn test_create_post_validation() {
        let req: CreatePostRequest = serde_json::from_value(serde_json::json!({
            "image_url": " ",
            "latitude": 1.0,
            "longitude": 2.0
        }))
        .unwrap();
        assert!(req.validate().is_err());
        assert!(req.caption.is_none());
    }
}
