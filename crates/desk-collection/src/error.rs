//! Collection and sink errors

use desk_model::ItemId;

/// Errors building the collection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    /// Id already present in either container
    #[error("duplicate item id: {0}")]
    DuplicateId(ItemId),

    /// Version group name already taken
    #[error("duplicate version group: {0}")]
    DuplicateGroup(String),
}

/// Errors applying a patch through the row mutation sink
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// Id resolves in neither container
    #[error("item not found: {0}")]
    NotFound(ItemId),

    /// Patch does not fit the row's current state
    #[error("conflict applying patch to {id}: {detail}")]
    Conflict { id: ItemId, detail: String },
}

impl SinkError {
    /// Create conflict error
    #[inline]
    pub fn conflict(id: ItemId, detail: impl Into<String>) -> Self {
        Self::Conflict {
            id,
            detail: detail.into(),
        }
    }

    /// Id the error refers to
    #[must_use]
    pub fn item_id(&self) -> &ItemId {
        match self {
            Self::NotFound(id) | Self::Conflict { id, .. } => id,
        }
    }
}
