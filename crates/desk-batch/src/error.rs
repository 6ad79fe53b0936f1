//! Error types for the batch engine
//!
//! Two families, handled very differently:
//! - [`BatchError`]: precondition failures, returned before any side effect
//! - [`FailureReason`] / [`SkipReason`]: per-item outcomes, accumulated in the
//!   [`BatchRun`](crate::BatchRun) and never raised mid-run

use crate::oracle::OracleError;
use desk_collection::SinkError;
use desk_ledger::LedgerError;
use serde::{Deserialize, Serialize};

/// Precondition errors. No item has been touched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// Eligible items exceed the credit balance
    #[error("insufficient credits: {needed} needed, {available} available")]
    InsufficientResource { needed: u64, available: u64 },

    /// Reject requested without a reason
    #[error("a rejection reason is required")]
    EmptyRejectionReason,

    /// Nothing to act on
    #[error("no items selected")]
    EmptySelection,

    /// Another run is in flight for this engine
    #[error("a batch run is already in progress")]
    RunInProgress,

    /// Selection exceeds the configured batch limit
    #[error("batch of {requested} items exceeds the limit of {limit}")]
    BatchTooLarge { requested: usize, limit: usize },
}

impl BatchError {
    /// Every variant is raised before any item is touched
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InsufficientResource { .. }
                | Self::EmptyRejectionReason
                | Self::EmptySelection
                | Self::RunInProgress
                | Self::BatchTooLarge { .. }
        )
    }

    /// Needs user action (change selection, reason or credits) before retrying
    #[inline]
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Self::RunInProgress)
    }

    /// Check if the same request may succeed later without user changes
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RunInProgress | Self::InsufficientResource { .. }
        )
    }
}

/// Why one item failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// Credit could not be consumed (lost a race with another consumer)
    #[error("insufficient resource")]
    ResourceExhausted,

    /// Scoring oracle failed
    #[error("check failed: {0}")]
    OracleFailure(String),

    /// Row rejected the patch
    #[error("mutation conflict: {0}")]
    MutationConflict(String),

    /// Row could not be resolved
    #[error("item not found")]
    NotFound,
}

impl FailureReason {
    /// Reason tag without detail, used for aggregate reporting
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ResourceExhausted => "insufficient resource",
            Self::OracleFailure(_) => "check failed",
            Self::MutationConflict(_) => "conflict",
            Self::NotFound => "not found",
        }
    }
}

impl From<LedgerError> for FailureReason {
    fn from(_: LedgerError) -> Self {
        Self::ResourceExhausted
    }
}

impl From<OracleError> for FailureReason {
    fn from(err: OracleError) -> Self {
        Self::OracleFailure(err.to_string())
    }
}

impl From<SinkError> for FailureReason {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::NotFound(_) => Self::NotFound,
            SinkError::Conflict { detail, .. } => Self::MutationConflict(detail),
        }
    }
}

/// Why one item was not attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Already carries check results
    AlreadyChecked,
    /// Run was cancelled before reaching the item
    Cancelled,
}
