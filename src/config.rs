// Configuration loaded from config.yaml in the data directory

use crate::store::{DEFAULT_HISTORY_LIMIT, StoreOptions};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshots kept per undo/redo stack; null for no limit
    pub history_limit: Option<usize>,
    /// Make import discard the redo buffer
    pub import_clears_redo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            import_clears_redo: false,
        }
    }
}

impl Config {
    /// Load `config.yaml` from `data_dir`, falling back to defaults when absent
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            debug!(file = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            history_limit: self.history_limit,
            import_clears_redo: self.import_clears_redo,
        }
    }
}

/// Default data directory: `<platform data dir>/taskmaster`, or `.taskmaster` when unknown
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("taskmaster"))
        .unwrap_or_else(|| PathBuf::from(".taskmaster"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.store_options(), StoreOptions::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse("history_limit: 20\nimport_clears_redo: true\n").unwrap();
        assert_eq!(config.history_limit, Some(20));
        assert!(config.import_clears_redo);
    }

    #[test]
    fn test_null_limit_is_unbounded() {
        let config = Config::parse("history_limit: null\n").unwrap();
        assert_eq!(config.history_limit, None);
        assert!(!config.import_clears_redo);
    }

    #[test]
    fn test_partial_and_empty_configs_use_defaults() {
        let config = Config::parse("import_clears_redo: true\n").unwrap();
        assert_eq!(config.history_limit, Some(DEFAULT_HISTORY_LIMIT));

        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_load_reports_bad_yaml() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "history_limit: [oops").unwrap();
        let err = Config::load(temp.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));
    }
}
