/// Error types for the ranking core
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for ranking operations
pub type Result<T> = std::result::Result<T, RankingError>;

#[derive(Error, Debug)]
pub enum RankingError {
    /// Client input outside the accepted bounds (coordinates, zoom, paging)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Weights that would push scores out of [0, 1]
    #[error("Invalid ranking weights: {0}")]
    InvalidWeights(String),

    /// A candidate reached distance scoring without coordinates.
    /// Upstream geo-cell filtering makes this unreachable for well-formed data.
    #[error("Candidate {0} has no coordinates")]
    MissingCoordinates(Uuid),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl RankingError {
    /// True when the caller sent bad input (as opposed to a server-side failure)
    pub fn is_client_error(&self) -> bool {
        matches!(self, RankingError::InvalidInput(_))
    }
}

/// Failures reported by a [`crate::store::FeedStore`] implementation.
///
/// The ranking core never retries; retry policy belongs to the store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store call timed out: {0}")]
    Timeout(String),
}

/// Failures reported by a [`crate::place::PlaceNameResolver`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("place lookup failed: {0}")]
    Lookup(String),

    #[error("place lookup timed out")]
    Timeout,
}
