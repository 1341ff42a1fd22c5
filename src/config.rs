//! User configuration loaded from `<config_dir>/hashcheck/config.toml`.
//!
//! Every field is optional. Command-line flags override whatever the file says.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::digest::{AlgorithmId, AlgorithmMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Algorithm selected when the interface starts
    pub default_algorithm: AlgorithmId,
    /// Restrict everything to MD5 and length-check provided digests
    pub md5_only: bool,
    /// Directory the file browser opens in; defaults to the home directory
    pub start_dir: Option<PathBuf>,
    /// List dot-files in the file browser
    pub show_hidden: bool,
    /// tracing filter directive, e.g. "info" or "hashcheck=debug". Unset means
    /// "info" for the TUI and "warn" for subcommands, whose stderr carries the
    /// progress bar.
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_algorithm: AlgorithmId::default(),
            md5_only: false,
            start_dir: None,
            show_hidden: false,
            log_level: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hashcheck").join("config.toml"))
    }

    /// Load configuration. An explicit `path` must exist; the default location
    /// is optional and falls back to built-in defaults when absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn algorithm_mode(&self) -> AlgorithmMode {
        if self.md5_only {
            AlgorithmMode::Fixed(AlgorithmId::Md5)
        } else {
            AlgorithmMode::Selectable(Some(self.default_algorithm))
        }
    }

    pub fn start_dir(&self) -> PathBuf {
        self.start_dir
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
