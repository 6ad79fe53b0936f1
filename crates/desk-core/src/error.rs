//! Error types for the review desk
//!
//! - [`ConfigError`]: loading or validating [`DeskConfig`](crate::DeskConfig)
//! - [`DeskError`]: everything a session operation can return

use desk_batch::BatchError;
use std::path::PathBuf;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Main review desk error type
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    /// Bulk action precondition failed
    #[error("batch rejected: {0}")]
    Batch(#[from] BatchError),

    /// Configuration error
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl DeskError {
    /// Get the batch precondition error, if any
    #[must_use]
    pub fn as_batch(&self) -> Option<&BatchError> {
        match self {
            Self::Batch(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}

/// Result type for review desk operations
pub type Result<T> = std::result::Result<T, DeskError>;
