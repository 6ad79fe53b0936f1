//! Asset rows and version groups

use chrono::{DateTime, Utc};
use desk_model::{EligibilityClass, ItemId, ReviewData, ReviewStatus, RowPatch};
use serde::{Deserialize, Serialize};

/// Media kind of a creative asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Copy,
}

/// One reviewable row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: ItemId,
    pub title: String,
    pub kind: MediaKind,
    pub status: ReviewStatus,
    /// Quality check results, once checked
    pub review: Option<ReviewData>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Create a pending, unchecked asset
    #[must_use]
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>, kind: MediaKind) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            status: ReviewStatus::Pending,
            review: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// With review results attached
    #[inline]
    #[must_use]
    pub fn with_review(mut self, review: ReviewData) -> Self {
        self.review = Some(review);
        self
    }

    /// With reviewer status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: ReviewStatus) -> Self {
        self.status = status;
        self
    }

    /// With explicit timestamps (fixtures, imports)
    #[inline]
    #[must_use]
    pub fn with_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = at;
        self
    }

    /// Derived lifecycle stage. The reviewer decision wins over check results.
    #[must_use]
    pub fn eligibility(&self) -> EligibilityClass {
        match self.status {
            ReviewStatus::Approved => EligibilityClass::Approved,
            ReviewStatus::Rejected => EligibilityClass::Rejected,
            ReviewStatus::Pending if self.review.is_some() => EligibilityClass::Checked,
            ReviewStatus::Pending => EligibilityClass::NeedsCheck,
        }
    }

    /// Score from the latest check
    #[inline]
    #[must_use]
    pub fn score(&self) -> Option<u8> {
        self.review.as_ref().map(|r| r.score)
    }

    /// Apply one patch in place.
    ///
    /// Returns a conflict description when the patch does not fit the
    /// current state; the row is left untouched in that case.
    pub(crate) fn apply_patch(&mut self, patch: RowPatch) -> Result<(), String> {
        match patch {
            RowPatch::ReviewCompleted(review) => {
                if self.review.is_some() {
                    return Err("check results already attached".to_string());
                }
                self.review = Some(review);
            }
            RowPatch::Approve => {
                if self.status != ReviewStatus::Approved {
                    self.eligibility()
                        .validate_transition(EligibilityClass::Approved)
                        .map_err(|e| e.to_string())?;
                    self.status = ReviewStatus::Approved;
                    self.rejection_reason = None;
                }
            }
            RowPatch::Reject { reason } => {
                let reason = reason.trim();
                if reason.is_empty() {
                    return Err("rejection reason is empty".to_string());
                }
                if self.status != ReviewStatus::Rejected {
                    self.eligibility()
                        .validate_transition(EligibilityClass::Rejected)
                        .map_err(|e| e.to_string())?;
                    self.status = ReviewStatus::Rejected;
                }
                self.rejection_reason = Some(reason.to_string());
            }
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Versions of one creative, each reviewed as its own row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionGroup {
    pub name: String,
    pub versions: Vec<Asset>,
}

impl VersionGroup {
    /// Create empty group
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            versions: Vec::new(),
        }
    }

    /// Append a version
    #[inline]
    #[must_use]
    pub fn with_version(mut self, asset: Asset) -> Self {
        self.versions.push(asset);
        self
    }
}
