/// PostgreSQL implementation of the feed store
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_ranking::{Candidate, CandidateQuery, FeedStore, GeoCell, StoreError};
use sqlx::PgPool;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{NewPost, PostWriter};

const CANDIDATE_COLUMNS: &str = r#"
    p.id AS post_id, p.user_id AS author_id, p.created_at, p.latitude, p.longitude,
    p.likes_count, p.comments_count, p.geohash, p.image_url, p.caption, p.location_name,
    u.username AS author_username, pr.avatar_url AS author_avatar_url
"#;

#[derive(Debug, sqlx::FromRow)]
struct CandidateRow {
    post_id: Uuid,
    author_id: Uuid,
    created_at: DateTime<Utc>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    likes_count: i64,
    comments_count: i64,
    geohash: Option<String>,
    image_url: String,
    caption: Option<String>,
    location_name: Option<String>,
    author_username: String,
    author_avatar_url: Option<String>,
}

impl From<CandidateRow> for Candidate {
    fn from(row: CandidateRow) -> Self {
        let geo_cell = row.geohash.as_deref().and_then(|raw| match GeoCell::parse(raw) {
            Ok(cell) => Some(cell),
            Err(e) => {
                warn!(post_id = %row.post_id, geohash = raw, error = %e, "Ignoring malformed stored geohash");
                None
            }
        });

        Candidate {
            post_id: row.post_id,
            author_id: row.author_id,
            created_at: row.created_at,
            latitude: row.latitude,
            longitude: row.longitude,
            likes_count: row.likes_count,
            comments_count: row.comments_count,
            geo_cell,
            image_url: row.image_url,
            caption: row.caption,
            location_name: row.location_name,
            author_username: row.author_username,
            author_avatar_url: row.author_avatar_url,
        }
    }
}

/// `LIKE` patterns for a prefix set. The geohash alphabet has no wildcard characters.
fn prefix_patterns(prefixes: &[GeoCell]) -> Vec<String> {
    prefixes.iter().map(|p| format!("{}%", p.as_str())).collect()
}

#[derive(Clone)]
pub struct PgFeedStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgFeedStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.bounded("ping", async {
            sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ())
        })
        .await
    }

    /// Run one store call under the configured timeout
    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(operation, error = %e, "Store query failed");
                Err(StoreError::Unavailable(format!("{}: {}", operation, e)))
            }
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.query_timeout.as_millis() as u64,
                    "Store query timed out"
                );
                Err(StoreError::Timeout(operation.to_string()))
            }
        }
    }
}

#[async_trait]
impl FeedStore for PgFeedStore {
    async fn candidates_by_geo_prefixes(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<Candidate>, StoreError> {
        let patterns = prefix_patterns(&query.prefixes);
        let author_ids: Option<Vec<Uuid>> = query
            .author_ids
            .as_ref()
            .map(|ids| ids.iter().copied().collect());
        let sql = format!(
            r#"
            SELECT {}
            FROM posts p
            JOIN users u ON u.id = p.user_id
            LEFT JOIN profiles pr ON pr.user_id = u.id
            WHERE p.geohash LIKE ANY($1)
              AND ($2::uuid[] IS NULL OR p.user_id = ANY($2))
            ORDER BY p.created_at DESC
            LIMIT $3
            "#,
            CANDIDATE_COLUMNS
        );

        let rows = self
            .bounded("candidates_by_geo_prefixes", async {
                sqlx::query_as::<_, CandidateRow>(&sql)
                    .bind(&patterns)
                    .bind(&author_ids)
                    .bind(query.limit as i64)
                    .fetch_all(&self.pool)
                    .await
            })
            .await?;

        debug!(
            prefixes = patterns.len(),
            rows = rows.len(),
            "Loaded nearby candidates"
        );
        Ok(rows.into_iter().map(Candidate::from).collect())
    }

    async fn following_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>, StoreError> {
        let ids = self
            .bounded("following_ids", async {
                sqlx::query_scalar::<_, Uuid>(
                    "SELECT following_id FROM followings WHERE follower_id = $1",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
            })
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn liked_post_ids(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, StoreError> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids = self
            .bounded("liked_post_ids", async {
                sqlx::query_scalar::<_, Uuid>(
                    "SELECT post_id FROM post_likes WHERE user_id = $1 AND post_id = ANY($2)",
                )
                .bind(user_id)
                .bind(post_ids)
                .fetch_all(&self.pool)
                .await
            })
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn home_feed_page(
        &self,
        following_ids: &HashSet<Uuid>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Candidate>, StoreError> {
        let following: Vec<Uuid> = following_ids.iter().copied().collect();
        let sql = format!(
            r#"
            SELECT {}
            FROM posts p
            JOIN users u ON u.id = p.user_id
            LEFT JOIN profiles pr ON pr.user_id = u.id
            ORDER BY CASE WHEN p.user_id = ANY($1) THEN 1 ELSE 0 END DESC,
                     p.created_at DESC
            OFFSET $2
            LIMIT $3
            "#,
            CANDIDATE_COLUMNS
        );

        let rows = self
            .bounded("home_feed_page", async {
                sqlx::query_as::<_, CandidateRow>(&sql)
                    .bind(&following)
                    .bind(offset as i64)
                    .bind(limit as i64)
                    .fetch_all(&self.pool)
                    .await
            })
            .await?;
        Ok(rows.into_iter().map(Candidate::from).collect())
    }
}

#[async_trait]
impl PostWriter for PgFeedStore {
    async fn create_post(&self, post: NewPost) -> Result<Uuid, StoreError> {
        self.bounded("create_post", async {
            let mut tx = self.pool.begin().await?;

            let post_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO posts (user_id, image_url, caption, location_name, latitude, longitude, geohash)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(post.author_id)
            .bind(&post.image_url)
            .bind(&post.caption)
            .bind(&post.location.location_name)
            .bind(post.location.latitude)
            .bind(post.location.longitude)
            .bind(post.location.geo_cell.as_ref().map(|c| c.as_str()))
            .fetch_one(&mut *tx)
            .await?;

            // Creates the profile row when the author has none
            sqlx::query(
                r#"
                INSERT INTO profiles (user_id, posts_count)
                VALUES ($1, 1)
                ON CONFLICT (user_id) DO UPDATE SET posts_count = profiles.posts_count + 1
                "#,
            )
            .bind(post.author_id)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok::<_, sqlx::Error>(post_id)
        })
        .await
    }
}
