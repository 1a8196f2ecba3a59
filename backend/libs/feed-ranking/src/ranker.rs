use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

use crate::error::{RankingError, Result};
use crate::metrics::{compute_metrics, MetricTriple, RequestContext};
use crate::normalize::MetricRange;
use crate::store::Candidate;

/// Candidates pulled per requested item before scoring
pub const DEFAULT_OVER_FETCH_FACTOR: usize = 5;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Size of the recency-ordered batch fetched for a page of `limit` items.
///
/// The true top-`limit` by score can fall outside this window.
pub fn over_fetch_limit(limit: usize, factor: usize) -> usize {
    limit.saturating_mul(factor.max(1))
}

/// Relative weight of each normalized factor in the composite score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    pub recency: f64,
    pub popularity: f64,
    pub proximity: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            recency: 0.5,
            popularity: 0.3,
            proximity: 0.2,
        }
    }
}

impl RankingWeights {
    /// Weights must be finite, non-negative and sum to 1 so every score stays in [0, 1].
    pub fn new(recency: f64, popularity: f64, proximity: f64) -> Result<Self> {
        let weights = Self {
            recency,
            popularity,
            proximity,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("recency", self.recency),
            ("popularity", self.popularity),
            ("proximity", self.proximity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RankingError::InvalidWeights(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let sum = self.recency + self.popularity + self.proximity;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(RankingError::InvalidWeights(format!(
                "weights must sum to 1.0, got {}",
                sum
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
    pub metrics: MetricTriple,
}

/// Weighted recency / popularity / proximity ranking over one candidate batch
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiFactorRanker {
    weights: RankingWeights,
}

impl MultiFactorRanker {
    pub fn new(weights: RankingWeights) -> Self {
        Self { weights }
    }

    /// Score, sort (stable, score descending) and truncate `batch` to `limit`.
    ///
    /// Normalization bounds come from this batch only. Ties keep batch order.
    pub fn rank(
        &self,
        batch: Vec<Candidate>,
        ctx: &RequestContext,
        limit: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let metrics = batch
            .iter()
            .map(|candidate| compute_metrics(candidate, ctx))
            .collect::<Result<Vec<_>>>()?;

        // Non-empty batch, so every range exists
        let age_range = MetricRange::from_values(metrics.iter().map(|m| m.age_seconds));
        let popularity_range = MetricRange::from_values(metrics.iter().map(|m| m.popularity));
        let distance_range = MetricRange::from_values(metrics.iter().map(|m| m.distance_km));
        let (Some(age_range), Some(popularity_range), Some(distance_range)) =
            (age_range, popularity_range, distance_range)
        else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<ScoredCandidate> = batch
            .into_iter()
            .zip(metrics)
            .map(|(candidate, metrics)| {
                let recency = 1.0 - age_range.scale(metrics.age_seconds);
                let popularity = popularity_range.scale(metrics.popularity);
                let proximity = 1.0 - distance_range.scale(metrics.distance_km);

                let score = (self.weights.recency * recency
                    + self.weights.popularity * popularity
                    + self.weights.proximity * proximity)
                    .clamp(0.0, 1.0);

                ScoredCandidate {
                    candidate,
                    score,
                    metrics,
                }
            })
            .collect();

        scored.sort_by(|a, b| match b.score.partial_cmp(&a.score) {
            Some(ord) => ord,
            None => {
                warn!(
                    post_a = %a.candidate.post_id,
                    post_b = %b.candidate.post_id,
                    score_a = a.score,
                    score_b = b.score,
                    "Encountered NaN score while ranking, keeping batch order"
                );
                Ordering::Equal
            }
        });

        debug!(
            batch_size = scored.len(),
            limit,
            top_score = scored.first().map(|s| s.score),
            "Ranked candidate batch"
        );

        scored.truncate(limit);
        Ok(scored)
    }
}
