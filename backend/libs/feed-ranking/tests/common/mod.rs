//! Shared fixtures for feed-ranking integration tests
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use feed_ranking::geohash::{encode, POST_PRECISION};
use feed_ranking::Candidate;
use uuid::Uuid;

pub const SF: (f64, f64) = (37.7749, -122.4194);

/// Longitude offset for `km` kilometers east along the equator
pub fn km_east(km: f64) -> f64 {
    km / 111.195
}

pub fn post_at(author_id: Uuid, created_at: DateTime<Utc>, latitude: f64, longitude: f64) -> Candidate {
    Candidate {
        post_id: Uuid::new_v4(),
        author_id,
        created_at,
        latitude: Some(latitude),
        longitude: Some(longitude),
        likes_count: 0,
        comments_count: 0,
        geo_cell: encode(latitude, longitude, POST_PRECISION).ok(),
        image_url: format!("https://cdn.nova.dev/posts/{}.jpg", Uuid::new_v4()),
        caption: Some("fixture".to_string()),
        location_name: None,
        author_username: format!("user_{}", &author_id.to_string()[..8]),
        author_avatar_url: None,
    }
}
