//! Configuration structures for the nbayes service.
//!
//! - [`StoreConfig`] - Where and how models are persisted
//! - [`Config`] - Root configuration combining all settings
//!
//! Configuration files are JSON. Every field is optional; missing fields take
//! the values from [`Default`].

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the file-backed model store.
///
/// # Examples
///
/// ```
/// use nb_core::StoreConfig;
///
/// let config = StoreConfig::default();
/// assert_eq!(config.model_dir, "saved_models");
/// assert!(config.create_dir);
/// assert!(!config.pretty);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one `<model_name>.json` file per model.
    pub model_dir: Utf8PathBuf,

    /// Create the model directory when the store is opened.
    pub create_dir: bool,

    /// Write indented JSON instead of compact JSON.
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            model_dir: Utf8PathBuf::from("saved_models"),
            create_dir: true,
            pretty: false,
        }
    }
}

impl StoreConfig {
    /// Creates a store configuration rooted at `model_dir` with default options.
    #[must_use]
    pub fn new(model_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Self::default()
        }
    }
}

/// Root configuration for the nbayes service.
///
/// # Examples
///
/// ```
/// use nb_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{"store": {"pretty": true}}"#).unwrap();
/// assert!(config.store.pretty);
/// assert_eq!(config.store.model_dir, "saved_models");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model store configuration.
    pub store: StoreConfig,
}

impl Config {
    /// Loads a configuration from a JSON file and validates it.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::InvalidPath {
                path: path.to_owned(),
                reason: "not a readable file".to_owned(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks option values that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.model_dir.as_str().is_empty() {
            return Err(ConfigError::InvalidOption {
                option: "store.model_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        if self.store.model_dir.is_file() {
            return Err(ConfigError::InvalidPath {
                path: self.store.model_dir.clone(),
                reason: "is a file, expected a directory".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.model_dir, Utf8PathBuf::from("saved_models"));
        assert!(config.create_dir);
        assert!(!config.pretty);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"store": {"model_dir": "/var/lib/nbayes"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.store.model_dir, Utf8PathBuf::from("/var/lib/nbayes"));
        assert!(config.store.create_dir);
    }

    #[test]
    fn test_validate_rejects_empty_model_dir() {
        let config = Config {
            store: StoreConfig::new(""),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("nbayes.json")).unwrap();
        fs::write(&path, r#"{"store": {"pretty": true}}"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(config.store.pretty);
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file(Utf8Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPath { .. }));
    }

    #[test]
    fn test_from_file_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("bad.json")).unwrap();
        fs::write(&path, "{]{]").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
