//! CLI configuration, read from a RON file.
//!
//! ```ron
//! (
//!     store_path: "/home/me/notes/quire.json",
//!     log_filter: "quire_doc=debug,info",
//!     placeholder: "Start typing...",
//! )
//! ```
//!
//! Every field is optional. The file itself is optional too, unless named
//! explicitly with `--config`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quire_editor::DEFAULT_PLACEHOLDER;

/// Default config location: `$XDG_CONFIG_HOME/quire/config.ron`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quire")
        .join("config.ron")
}

/// Default session file: `$XDG_DATA_HOME/quire/store.json`.
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quire")
        .join("store.json")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session file holding pages and blocks.
    pub store_path: PathBuf,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Shown for empty text blocks.
    pub placeholder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            log_filter: "info".to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl Config {
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).context("invalid config")
    }

    /// Load from `explicit` if given (must exist), else from the default
    /// location if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (default_config_path(), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_ron(&text).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_ron(r#"(log_filter: "debug")"#).unwrap();
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.placeholder, DEFAULT_PLACEHOLDER);
        assert_eq!(config.store_path, default_store_path());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        std::fs::write(
            &path,
            r#"(store_path: "/tmp/quire-test.json", placeholder: "Write...")"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/tmp/quire-test.json"));
        assert_eq!(config.placeholder, "Write...");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.ron"))).is_err());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(Config::from_ron("(log_filter: 42)").is_err());
    }
}
