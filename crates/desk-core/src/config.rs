//! Review desk configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is valid:
//!
//! ```toml
//! page_size = 25
//! initial_credits = 100
//! log_filter = "info"
//!
//! [engine]
//! max_batch_size = 500
//! ```

use crate::error::ConfigError;
use desk_batch::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Review desk configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Rows per page on both screens
    pub page_size: usize,
    /// Starting balance of the demo credit ledger
    pub initial_credits: u64,
    /// Batch engine tuning
    pub engine: EngineConfig,
    /// Default `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl DeskConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With page size
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// With initial credits
    #[inline]
    #[must_use]
    pub fn with_initial_credits(mut self, credits: u64) -> Self {
        self.initial_credits = credits;
        self
    }

    /// With engine configuration
    #[inline]
    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`DeskConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be > 0".into()));
        }
        if self.engine.max_batch_size == Some(0) {
            return Err(ConfigError::Invalid(
                "engine.max_batch_size must be > 0 when set".into(),
            ));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            initial_credits: 100,
            engine: EngineConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = DeskConfig::from_toml_str("").unwrap();
        assert_eq!(config, DeskConfig::default());
        assert_eq!(config.page_size, 25);
        assert_eq!(config.engine.max_batch_size, None);
    }

    #[test]
    fn parses_nested_engine_table() {
        let config = DeskConfig::from_toml_str(
            r#"
            page_size = 10
            log_filter = "desk_batch=debug"

            [engine]
            max_batch_size = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.initial_credits, 100);
        assert_eq!(config.engine.max_batch_size, Some(50));
        assert_eq!(config.log_filter, "desk_batch=debug");
    }

    #[test]
    fn rejects_zero_page_size() {
        let err = DeskConfig::from_toml_str("page_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_wrong_types() {
        let err = DeskConfig::from_toml_str("page_size = \"ten\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "initial_credits = 7").unwrap();
        let config = DeskConfig::load(file.path()).unwrap();
        assert_eq!(config.initial_credits, 7);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DeskConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn builder_overrides() {
        let config = DeskConfig::new()
            .with_page_size(5)
            .with_initial_credits(3)
            .with_engine(EngineConfig::default().with_max_batch_size(2));
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.max_batch_size, Some(2));
    }
}
