//! Engine configuration

use serde::{Deserialize, Serialize};

/// Batch engine tuning
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on de-duplicated targets per run; `None` means unbounded
    pub max_batch_size: Option<usize>,
}

impl EngineConfig {
    /// Set the batch size limit
    #[inline]
    #[must_use]
    pub fn with_max_batch_size(mut self, limit: usize) -> Self {
        self.max_batch_size = Some(limit);
        self
    }
}
