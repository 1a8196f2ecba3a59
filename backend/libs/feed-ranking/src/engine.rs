/// Ranking entry points: nearby discovery and the home feed
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{RankingError, Result};
use crate::geohash::{search_cells, validate_coordinates};
use crate::metrics::RequestContext;
use crate::pagination::{
    validate_limit, PageRequest, RankedPage, DEFAULT_FEED_LIMIT, DEFAULT_NEARBY_LIMIT,
};
use crate::precision::{ZoomLevel, DEFAULT_ZOOM};
use crate::prioritizer::SocialFeedPrioritizer;
use crate::ranker::{over_fetch_limit, MultiFactorRanker, RankingWeights, DEFAULT_OVER_FETCH_FACTOR};
use crate::store::{Candidate, CandidateQuery, FeedStore};

/// Geographic discovery request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_zoom")]
    pub zoom: i64,
    #[serde(default)]
    pub following_only: bool,
    #[serde(default = "default_nearby_limit")]
    pub limit: i64,
}

fn default_zoom() -> i64 {
    DEFAULT_ZOOM as i64
}

fn default_nearby_limit() -> i64 {
    DEFAULT_NEARBY_LIMIT as i64
}

fn default_feed_limit() -> i64 {
    DEFAULT_FEED_LIMIT as i64
}

impl NearbyQuery {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            zoom: default_zoom(),
            following_only: false,
            limit: default_nearby_limit(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.checked().map(|_| ())
    }

    fn checked(&self) -> Result<(ZoomLevel, usize)> {
        validate_coordinates(self.latitude, self.longitude)?;
        let zoom = u8::try_from(self.zoom)
            .map_err(|_| RankingError::InvalidInput(format!("zoom out of range: {}", self.zoom)))
            .and_then(ZoomLevel::new)?;
        let limit = validate_limit(self.limit)?;
        Ok((zoom, limit))
    }
}

/// Home feed page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_feed_limit")]
    pub limit: i64,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: default_feed_limit(),
        }
    }
}

impl FeedQuery {
    pub fn page(&self) -> Result<PageRequest> {
        PageRequest::new(self.offset, self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub weights: RankingWeights,
    /// Candidates fetched per requested item before scoring
    pub over_fetch_factor: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: RankingWeights::default(),
            over_fetch_factor: DEFAULT_OVER_FETCH_FACTOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationSummary {
    pub name: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorSummary {
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub is_following: bool,
}

/// One feed item annotated with viewer-relative flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PostSummary {
    pub post_id: Uuid,
    pub image_url: String,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub location: LocationSummary,
    pub is_liked: bool,
    pub user: AuthorSummary,
}

impl PostSummary {
    fn from_candidate(
        candidate: Candidate,
        liked: &HashSet<Uuid>,
        following: &HashSet<Uuid>,
    ) -> Self {
        Self {
            is_liked: liked.contains(&candidate.post_id),
            user: AuthorSummary {
                user_id: candidate.author_id,
                username: candidate.author_username,
                avatar_url: candidate.author_avatar_url,
                is_following: following.contains(&candidate.author_id),
            },
            location: LocationSummary {
                name: candidate.location_name,
                longitude: candidate.longitude,
                latitude: candidate.latitude,
            },
            post_id: candidate.post_id,
            image_url: candidate.image_url,
            caption: candidate.caption,
            created_at: candidate.created_at,
            likes_count: candidate.likes_count,
            comments_count: candidate.comments_count,
        }
    }
}

/// Stateless per request; share one engine across workers.
pub struct FeedEngine {
    store: Arc<dyn FeedStore>,
    ranker: MultiFactorRanker,
    over_fetch_factor: usize,
}

impl FeedEngine {
    pub fn new(store: Arc<dyn FeedStore>, config: EngineConfig) -> Result<Self> {
        config.weights.validate()?;
        if config.over_fetch_factor == 0 {
            return Err(RankingError::InvalidInput(
                "over-fetch factor must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            store,
            ranker: MultiFactorRanker::new(config.weights),
            over_fetch_factor: config.over_fetch_factor,
        })
    }

    pub async fn nearby_posts(
        &self,
        viewer_id: Uuid,
        query: &NearbyQuery,
    ) -> Result<RankedPage<PostSummary>> {
        self.nearby_posts_at(viewer_id, query, Utc::now()).await
    }

    /// Nearby discovery with an explicit clock
    #[instrument(skip(self, query), fields(zoom = query.zoom, following_only = query.following_only))]
    pub async fn nearby_posts_at(
        &self,
        viewer_id: Uuid,
        query: &NearbyQuery,
        now: DateTime<Utc>,
    ) -> Result<RankedPage<PostSummary>> {
        let (zoom, limit) = query.checked()?;
        let prefixes = search_cells(query.latitude, query.longitude, zoom.precision())?;

        let following = self.store.following_ids(viewer_id).await?;
        if query.following_only && following.is_empty() {
            debug!(user_id = %viewer_id, "Following-only discovery with no followees");
            return Ok(RankedPage::empty());
        }

        let candidate_query = CandidateQuery {
            prefixes,
            author_ids: query.following_only.then(|| following.clone()),
            limit: over_fetch_limit(limit, self.over_fetch_factor),
        };
        let batch = self.store.candidates_by_geo_prefixes(&candidate_query).await?;
        debug!(
            user_id = %viewer_id,
            precision = zoom.precision(),
            batch_size = batch.len(),
            "Fetched nearby candidates"
        );

        if batch.is_empty() {
            return Ok(RankedPage::empty());
        }

        let ctx = RequestContext::new(now, query.latitude, query.longitude);
        let ranked = self.ranker.rank(batch, &ctx, limit)?;
        let candidates: Vec<Candidate> = ranked.into_iter().map(|s| s.candidate).collect();

        let items = self.annotate(viewer_id, candidates, &following).await?;
        Ok(RankedPage::from_items(items, limit))
    }

    #[instrument(skip(self, query), fields(offset = query.offset, limit = query.limit))]
    pub async fn home_feed(
        &self,
        viewer_id: Uuid,
        query: &FeedQuery,
    ) -> Result<RankedPage<PostSummary>> {
        let page = query.page()?;

        let following = self.store.following_ids(viewer_id).await?;
        let mut candidates = self
            .store
            .home_feed_page(&following, page.offset, page.limit)
            .await?;
        SocialFeedPrioritizer::new(&following).order(&mut candidates);

        debug!(
            user_id = %viewer_id,
            following = following.len(),
            returned = candidates.len(),
            "Fetched home feed page"
        );

        let items = self.annotate(viewer_id, candidates, &following).await?;
        Ok(RankedPage::from_items(items, page.limit))
    }

    /// Join liked/following flags in memory after one batched likes lookup
    async fn annotate(
        &self,
        viewer_id: Uuid,
        candidates: Vec<Candidate>,
        following: &HashSet<Uuid>,
    ) -> Result<Vec<PostSummary>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = candidates.iter().map(|c| c.post_id).collect();
        let liked = self.store.liked_post_ids(viewer_id, &post_ids).await?;

        Ok(candidates
            .into_iter()
            .map(|candidate| PostSummary::from_candidate(candidate, &liked, following))
            .collect())
    }
}
