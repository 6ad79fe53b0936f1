//! Review results and row patches

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reviewer decision recorded on a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Blocker,
}

/// One observation produced by a quality check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    /// Create new finding
    #[inline]
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Output of the scoring oracle for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewData {
    /// Overall score, 0..=100
    pub score: u8,
    pub findings: Vec<Finding>,
    pub checked_at: DateTime<Utc>,
}

impl ReviewData {
    /// Maximum score
    pub const MAX_SCORE: u8 = 100;

    /// Create review data stamped with the current time
    ///
    /// Scores above [`Self::MAX_SCORE`] are clamped.
    #[must_use]
    pub fn new(score: u8, findings: Vec<Finding>) -> Self {
        Self {
            score: score.min(Self::MAX_SCORE),
            findings,
            checked_at: Utc::now(),
        }
    }
}

/// A single write applied back onto the canonical collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RowPatch {
    /// Attach quality check results
    ReviewCompleted(ReviewData),
    /// Mark approved
    Approve,
    /// Mark rejected with a reviewer-supplied reason
    Reject { reason: String },
}

impl RowPatch {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReviewCompleted(_) => "review_completed",
            Self::Approve => "approve",
            Self::Reject { .. } => "reject",
        }
    }
}
