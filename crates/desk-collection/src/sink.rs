//! Row mutation sink and eligibility source contracts

use crate::error::SinkError;
use crate::store::AssetCollection;
use async_trait::async_trait;
use desk_model::{EligibilityClass, ItemId, RowPatch};

/// Write side of the collection.
///
/// Implementations resolve `id` across every container that may hold it and
/// apply `patch`. A missing id is reported as [`SinkError::NotFound`], never
/// as a panic.
#[async_trait]
pub trait RowMutationSink: Send + Sync {
    /// Apply one patch to one row
    async fn apply(&self, id: &ItemId, patch: RowPatch) -> Result<(), SinkError>;
}

/// Read side used to classify items before a batch run
pub trait EligibilitySource: Send + Sync {
    /// Lifecycle stage of `id`, or `None` if unknown
    fn eligibility(&self, id: &ItemId) -> Option<EligibilityClass>;

    /// Whether `id` already carries check results, or `None` if unknown
    fn has_review(&self, id: &ItemId) -> Option<bool>;
}

#[async_trait]
impl RowMutationSink for AssetCollection {
    async fn apply(&self, id: &ItemId, patch: RowPatch) -> Result<(), SinkError> {
        self.apply_patch(id, patch)
    }
}

impl EligibilitySource for AssetCollection {
    fn eligibility(&self, id: &ItemId) -> Option<EligibilityClass> {
        self.class_of(id)
    }

    fn has_review(&self, id: &ItemId) -> Option<bool> {
        self.is_reviewed(id)
    }
}
