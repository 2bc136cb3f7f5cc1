//! Tool configuration discovery and loading.
//!
//! Configuration is optional. Resolution order, later overrides earlier:
//!
//! 1. Built-in defaults
//! 2. User global config (`~/.compass/config.yml`)
//! 3. An explicit `--config` path
//! 4. Individual command-line overrides (`--data-root`)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CompassError, Result};

/// Root-level configuration for the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompassConfig {
    /// Directory holding per-student record folders.
    pub data_root: PathBuf,
    /// Directory holding the catalog unit files.
    pub catalog_dir: PathBuf,
    /// Directory holding community difficulty snapshots.
    pub community_dir: PathBuf,
}

impl Default for CompassConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("user_info"),
            catalog_dir: PathBuf::from("data"),
            community_dir: PathBuf::from("forum_data"),
        }
    }
}

impl CompassConfig {
    /// Load configuration, preferring an explicit path over discovery.
    ///
    /// An explicit path that is missing or malformed is an error; a missing
    /// user-global config silently falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match find_user_global() {
                Some(path) => Self::from_file(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Parse one YAML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CompassError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| CompassError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Find the user's global config at ~/.compass/config.yml
fn find_user_global() -> Option<PathBuf> {
    let path = dirs::home_dir()?.join(".compass").join("config.yml");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}
