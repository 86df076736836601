//! Configuration for palmap hosts.
//!
//! The config file is optional; every field has a default.
//!
//! # Config file locations
//!
//! Priority order:
//! 1. `$PALMAP_CONFIG` environment variable
//! 2. `~/.config/palmap/config.toml`

use palmap_core::{DEFAULT_LARGE_IMAGE_THRESHOLD, DEFAULT_MAX_HISTORY, EngineConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct PalmapConfig {
    /// Rasters with more pixels than this are indexed incrementally.
    pub large_image_threshold: usize,
    /// Undo/redo depth.
    pub max_history: usize,
    /// Write the `PMAP` text chunk when saving PNG.
    pub embed_pmap_on_save: bool,
    /// Restore the palette from an embedded `PMAP` chunk on open.
    pub restore_embedded_pmap: bool,
    /// Pretty-print exported JSON indexes.
    pub json_pretty: bool,
}

impl Default for PalmapConfig {
    fn default() -> Self {
        Self {
            large_image_threshold: DEFAULT_LARGE_IMAGE_THRESHOLD,
            max_history: DEFAULT_MAX_HISTORY,
            embed_pmap_on_save: true,
            restore_embedded_pmap: true,
            json_pretty: true,
        }
    }
}

impl PalmapConfig {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if no config file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!(
                "No config file found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        log::info!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: PalmapConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the config file path based on environment.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("PALMAP_CONFIG") {
            return PathBuf::from(path);
        }

        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/palmap/config.toml")
    }

    /// The subset of settings the core engine uses.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            large_image_threshold: self.large_image_threshold,
            max_history: self.max_history,
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.large_image_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "large_image_threshold must be at least 1".to_string(),
            ));
        }

        if self.max_history > 10_000 {
            return Err(ConfigError::ValidationError(format!(
                "max_history must be <= 10,000, got {}",
                self.max_history
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PalmapConfig::default();
        assert_eq!(config.large_image_threshold, 50_000);
        assert_eq!(config.max_history, 50);
        assert!(config.embed_pmap_on_save);
        assert!(config.json_pretty);
        assert_eq!(config.engine(), EngineConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = PalmapConfig::default();

        config.large_image_threshold = 0;
        assert!(config.validate().is_err());

        config.large_image_threshold = 1;
        assert!(config.validate().is_ok());

        config.max_history = 20_000;
        assert!(config.validate().is_err());

        config.max_history = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_string() {
        let toml = r#"
large_image_threshold = 1000
json_pretty = false
"#;

        let config = PalmapConfig::from_toml(toml).unwrap();
        assert_eq!(config.large_image_threshold, 1000);
        assert!(!config.json_pretty);
        assert_eq!(config.max_history, 50);
    }

    #[test]
    fn test_deny_unknown_fields() {
        let result = PalmapConfig::from_toml("unknown_field = \"oops\"\n");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_invalid_value_rejected_on_load() {
        let result = PalmapConfig::from_toml("large_image_threshold = 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let path = PathBuf::from("/nonexistent/config.toml");
        let config = PalmapConfig::load_from(&path).unwrap();
        assert_eq!(config, PalmapConfig::default());
    }
}
