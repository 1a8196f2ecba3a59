/// Read-side contract between the ranking core and post storage
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::error::StoreError;
use crate::geohash::GeoCell;
use crate::pagination::window;
use crate::prioritizer::SocialFeedPrioritizer;

/// Flat projection of a post joined with its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub geo_cell: Option<GeoCell>,
    pub image_url: String,
    pub caption: Option<String>,
    pub location_name: Option<String>,
    pub author_username: String,
    pub author_avatar_url: Option<String>,
}

impl Candidate {
    /// `(latitude, longitude)` when both are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn matches_any_prefix(&self, prefixes: &[GeoCell]) -> bool {
        match &self.geo_cell {
            Some(cell) => prefixes.iter().any(|prefix| prefix.contains(cell)),
            None => false,
        }
    }
}

/// Geo-prefix candidate fetch, newest first
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub prefixes: Vec<GeoCell>,
    /// Restrict to these authors (following-only discovery)
    pub author_ids: Option<HashSet<Uuid>>,
    pub limit: usize,
}

#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Posts whose geo-cell starts with any of `query.prefixes`,
    /// ordered by `created_at` descending, at most `query.limit`.
    async fn candidates_by_geo_prefixes(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<Candidate>, StoreError>;

    async fn following_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>, StoreError>;

    /// Subset of `post_ids` liked by `user_id`
    async fn liked_post_ids(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, StoreError>;

    /// All posts ordered followed-authors-first then newest first,
    /// windowed by `offset` / `limit` after ordering.
    async fn home_feed_page(
        &self,
        following_ids: &HashSet<Uuid>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Candidate>, StoreError>;
}

/// Snapshot store backed by plain collections, for tests and local runs
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeedStore {
    posts: Vec<Candidate>,
    following: HashMap<Uuid, HashSet<Uuid>>,
    likes: HashMap<Uuid, HashSet<Uuid>>,
}

impl InMemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post(mut self, candidate: Candidate) -> Self {
        self.posts.push(candidate);
        self
    }

    pub fn with_posts(mut self, candidates: impl IntoIterator<Item = Candidate>) -> Self {
        self.posts.extend(candidates);
        self
    }

    pub fn with_follow(mut self, follower: Uuid, followee: Uuid) -> Self {
        self.following.entry(follower).or_default().insert(followee);
        self
    }

    pub fn with_like(mut self, user_id: Uuid, post_id: Uuid) -> Self {
        self.likes.entry(user_id).or_default().insert(post_id);
        self
    }

    pub fn posts(&self) -> &[Candidate] {
        &self.posts
    }
}

#[async_trait]
impl FeedStore for InMemoryFeedStore {
    async fn candidates_by_geo_prefixes(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<Candidate>, StoreError> {
        let mut matched: Vec<Candidate> = self
            .posts
            .iter()
            .filter(|c| c.matches_any_prefix(&query.prefixes))
            .filter(|c| {
                query
                    .author_ids
                    .as_ref()
                    .map_or(true, |authors| authors.contains(&c.author_id))
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched.truncate(query.limit);
        Ok(matched)
    }

    async fn following_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>, StoreError> {
        Ok(self.following.get(&user_id).cloned().unwrap_or_default())
    }

    async fn liked_post_ids(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, StoreError> {
        let Some(liked) = self.likes.get(&user_id) else {
            return Ok(HashSet::new());
        };
        Ok(post_ids
            .iter()
            .filter(|id| liked.contains(id))
            .copied()
            .collect())
    }

    async fn home_feed_page(
        &self,
        following_ids: &HashSet<Uuid>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Candidate>, StoreError> {
        let mut ordered = self.posts.clone();
        SocialFeedPrioritizer::new(following_ids).order(&mut ordered);
        Ok(window(&ordered, offset, limit))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::candidate_at;
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_prefix_fetch_is_newest_first_and_bounded() {
        let now = Utc::now();
        let sf_old = candidate_at(now - Duration::hours(2), 37.7749, -122.4194);
        let sf_new = candidate_at(now, 37.7750, -122.4195);
        let nyc = candidate_at(now, 40.7128, -74.0060);
        let mut untagged = candidate_at(now, 37.7749, -122.4194);
        untagged.geo_cell = None;

        let store = InMemoryFeedStore::new().with_posts(vec![
            sf_old.clone(),
            nyc,
            sf_new.clone(),
            untagged,
        ]);

        let query = CandidateQuery {
            prefixes: vec![GeoCell::parse("9q8").unwrap()],
            author_ids: None,
            limit: 10,
        };
        let found = store.candidates_by_geo_prefixes(&query).await.unwrap();
        let ids: Vec<_> = found.iter().map(|c| c.post_id).collect();
        assert_eq!(ids, vec![sf_new.post_id, sf_old.post_id]);

        let bounded = CandidateQuery { limit: 1, ..query };
        assert_eq!(store.candidates_by_geo_prefixes(&bounded).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_author_filter_and_viewer_sets() {
        let now = Utc::now();
        let viewer = Uuid::new_v4();
        let friend_post = candidate_at(now, 37.7749, -122.4194);
        let other_post = candidate_at(now, 37.7749, -122.4194);

        let store = InMemoryFeedStore::new()
            .with_posts(vec![friend_post.clone(), other_post.clone()])
            .with_follow(viewer, friend_post.author_id)
            .with_like(viewer, other_post.post_id);

        let following = store.following_ids(viewer).await.unwrap();
        assert!(following.contains(&friend_post.author_id));

        let query = CandidateQuery {
            prefixes: vec![GeoCell::parse("9").unwrap()],
            author_ids: Some(following),
            limit: 10,
        };
        let found = store.candidates_by_geo_prefixes(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].post_id, friend_post.post_id);

        let liked = store
            .liked_post_ids(viewer, &[friend_post.post_id, other_post.post_id])
            .await
            .unwrap();
        assert_eq!(liked.len(), 1);
        assert!(liked.contains(&other_post.post_id));

        assert!(store.following_ids(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
