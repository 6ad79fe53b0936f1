//! Scoring oracle contract
//!
//! The review-score heuristics live outside this crate. The engine only
//! needs an async function from an item id to [`ReviewData`] that may fail.

use async_trait::async_trait;
use desk_model::{ItemId, ReviewData};

/// Oracle errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// Scoring backend could not be reached
    #[error("scoring unavailable: {0}")]
    Unavailable(String),

    /// Item could not be scored
    #[error("scoring rejected: {0}")]
    Rejected(String),
}

/// Produces review data for one item
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    /// Score a single item
    async fn score(&self, id: &ItemId) -> Result<ReviewData, OracleError>;
}
