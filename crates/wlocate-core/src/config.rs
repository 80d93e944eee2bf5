//! Persistent finder configuration.
//!
//! Stored in `~/.wlocate/config.json`. Every field is optional in the file;
//! missing fields take their defaults.
//!
//! # Example
//!
//! ```no_run
//! use wlocate_core::config::FinderConfig;
//!
//! // Load (returns defaults if the file doesn't exist)
//! let config = FinderConfig::load();
//! println!("page target: {}", config.page_target);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ranking::{MatchKind, Priorities};

const CONFIG_FILENAME: &str = "config.json";

/// The default page pseudo-target.
pub const DEFAULT_PAGE_TARGET: &str = "$page";

/// Errors reading or writing the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown match kind '{0}'")]
    UnknownMatchKind(String),

    #[error("Could not determine home directory")]
    NoHomeDirectory,
}

/// Returns the wlocate directory (`~/.wlocate`), if a home directory exists.
pub fn wlocate_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".wlocate"))
}

/// Settings shared by all finders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Worker pool size; `None` uses the available parallelism.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_threads: Option<usize>,

    /// Overrides of the built-in match-kind priorities.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub priorities: BTreeMap<MatchKind, u32>,

    /// The locator value that stands for the whole page.
    pub page_target: String,

    /// Whether the "for text" finder falls back to the first element after
    /// the path when the target is empty.
    pub unknown_fallback: bool,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            priorities: BTreeMap::new(),
            page_target: DEFAULT_PAGE_TARGET.to_string(),
            unknown_fallback: true,
        }
    }
}

impl FinderConfig {
    /// Load config from `~/.wlocate/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        wlocate_dir()
            .and_then(|dir| Self::load_from(dir.join(CONFIG_FILENAME)).ok())
            .unwrap_or_default()
    }

    /// Load config from an explicit path, reporting every failure.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save config to `~/.wlocate/config.json`.
    pub fn save(&self) -> Result<(), ConfigError> {
        let dir = wlocate_dir().ok_or(ConfigError::NoHomeDirectory)?;
        std::fs::create_dir_all(&dir)?;
        self.save_to(dir.join(CONFIG_FILENAME))
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Sets a priority override from a `NAME=VALUE` pair such as
    /// `BY_TEXT=100`.
    pub fn set_priority(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| ConfigError::UnknownMatchKind(assignment.to_string()))?;
        let kind: MatchKind = name.parse()?;
        let value = value
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::UnknownMatchKind(assignment.to_string()))?;
        self.priorities.insert(kind, value);
        Ok(())
    }

    pub fn priorities(&self) -> Priorities {
        Priorities::new(self.priorities.clone())
    }

    /// The configured pool size, or the available parallelism.
    pub fn effective_worker_threads(&self) -> usize {
        self.worker_threads
            .filter(|n| *n > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
    }
}
