/// Per-candidate raw metrics relative to a request
use chrono::{DateTime, Utc};

use crate::error::{RankingError, Result};
use crate::store::Candidate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Inputs shared by every candidate in one ranking pass
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    pub now: DateTime<Utc>,
    pub viewer_latitude: f64,
    pub viewer_longitude: f64,
}

impl RequestContext {
    pub fn new(now: DateTime<Utc>, viewer_latitude: f64, viewer_longitude: f64) -> Self {
        Self {
            now,
            viewer_latitude,
            viewer_longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricTriple {
    pub age_seconds: f64,
    pub popularity: f64,
    pub distance_km: f64,
}

/// Great-circle distance in kilometers (haversine)
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Compute (age, popularity, distance) for one candidate.
///
/// Fails with `MissingCoordinates` instead of substituting a default distance.
pub fn compute_metrics(candidate: &Candidate, ctx: &RequestContext) -> Result<MetricTriple> {
    let (latitude, longitude) = candidate
        .coordinates()
        .ok_or(RankingError::MissingCoordinates(candidate.post_id))?;

    let age_seconds = (ctx.now - candidate.created_at).num_milliseconds() as f64 / 1000.0;
    let popularity = (candidate.likes_count + candidate.comments_count) as f64;
    let distance_km = haversine_km(
        ctx.viewer_latitude,
        ctx.viewer_longitude,
        latitude,
        longitude,
    );

    Ok(MetricTriple {
        age_seconds,
        popularity,
        distance_km,
    })
}
