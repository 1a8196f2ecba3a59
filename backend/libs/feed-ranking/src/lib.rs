//! Feed Ranking Library
//!
//! Ranking and geospatial discovery core for the feed service. Turns an unordered
//! pool of candidate posts into a bounded, ordered, paginated result.
//!
//! # Modules
//!
//! - `geohash`: geohash encoding, decoding and neighbor cells
//! - `precision`: map zoom level to geohash precision
//! - `metrics`: per-candidate age, popularity and distance
//! - `normalize`: batch-relative min-max normalization
//! - `ranker`: weighted multi-factor scoring for nearby discovery
//! - `prioritizer`: followed-first ordering for the home feed
//! - `pagination`: page bounds and end-of-page detection
//! - `store`: read models and the store collaborator contract
//! - `engine`: the two ranking entry points (nearby, home feed)
//! - `place`: place-name resolution and geotagging of new posts
pub mod engine;
pub mod error;
pub mod geohash;
pub mod metrics;
pub mod normalize;
pub mod pagination;
pub mod place;
pub mod precision;
pub mod prioritizer;
pub mod ranker;
pub mod store;

pub use engine::{
    AuthorSummary, EngineConfig, FeedEngine, FeedQuery, LocationSummary, NearbyQuery,
    PostSummary,
};
pub use error::{RankingError, ResolveError, Result, StoreError};
pub use geohash::GeoCell;
pub use pagination::{PageRequest, RankedPage};
pub use place::{GeoTag, GeoTagger, PlaceNameResolver};
pub use ranker::{MultiFactorRanker, RankingWeights, ScoredCandidate};
pub use store::{Candidate, CandidateQuery, FeedStore};
