/// Database access layer
///
/// `PgFeedStore` serves the ranking core's read contract and the post write path.
pub mod pg_store;

use async_trait::async_trait;
use feed_ranking::{GeoTag, StoreError};
use uuid::Uuid;

pub use pg_store::PgFeedStore;

/// Post to be inserted, already geotagged
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub image_url: String,
    pub caption: Option<String>,
    pub location: GeoTag,
}

#[async_trait]
pub trait PostWriter: Send + Sync {
    /// Insert the post and bump the author's post counter atomically
    async fn create_post(&self, post: NewPost) -> Result<Uuid, StoreError>;
}
