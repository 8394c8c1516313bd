//! Configuration loading and management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Project-local config file looked up when no explicit path is given.
pub const DEFAULT_CONFIG_PATH: &str = ".task-board/config.yaml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Where the board snapshot is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the JSON snapshot file.
    #[serde(default = "default_board_path")]
    pub path: PathBuf,

    /// Keep a `.bak` copy of a snapshot that failed to load.
    #[serde(default = "default_true")]
    pub backup_corrupt: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_board_path(),
            backup_corrupt: true,
        }
    }
}

fn default_board_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("task-board").join("board.json"))
        .unwrap_or_else(|| PathBuf::from(".task-board/board.json"))
}

fn default_true() -> bool {
    true
}

/// Image ingestion limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Maximum file size in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Accepted MIME types.
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_max_bytes() -> u64 {
    2 * 1024 * 1024 // 2MB
}

fn default_allowed_types() -> Vec<String> {
    ["image/jpeg", "image/png", "image/gif", "image/webp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// How the CLI renders the board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub format: DisplayFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayFormat {
    #[default]
    Markdown,
    Json,
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from an explicit path (errors propagate), else from
    /// [`DEFAULT_CONFIG_PATH`] if present, else defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading config");
            return Self::load(path);
        }

        let fallback = Path::new(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            match Self::load(fallback) {
                Ok(config) => return Ok(config),
                Err(e) => warn!(path = %fallback.display(), error = %e, "ignoring invalid config"),
            }
        }

        Ok(Self::default())
    }

    /// Ensure the snapshot directory exists.
    pub fn ensure_storage_dir(&self) -> Result<()> {
        if let Some(parent) = self.storage.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.images.max_bytes, 2 * 1024 * 1024);
        assert_eq!(config.images.allowed_types.len(), 4);
        assert!(config.storage.backup_corrupt);
        assert!(config.storage.path.ends_with("board.json"));
        assert_eq!(config.display.format, DisplayFormat::Markdown);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "storage:\n  path: /tmp/b.json\ndisplay:\n  format: json\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.storage.path, PathBuf::from("/tmp/b.json"));
        assert!(config.storage.backup_corrupt);
        assert_eq!(config.display.format, DisplayFormat::Json);
        assert_eq!(config.images, ImagesConfig::default());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "images:\n  max_bytes: 1024\n").unwrap();

        let config = Config::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.images.max_bytes, 1024);
    }

    #[test]
    fn test_load_explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_or_default(Some(&dir.path().join("nope.yaml"))).is_err());
    }
}
