// File: crates/metafade-cli/src/config.rs

//! User preferences, read from a `config.toml` file.
//!
//! ```toml
//! in_place = true
//!
//! [profile]
//! gps = "zero"
//! extra_tags = ["GPSAltitude"]
//! ```

use anyhow::{Context, Result};
use metafade_core::{SaveTarget, ScrubProfile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";
const APP_NAME: &str = "metafade";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overwrite originals; otherwise write `name.clean.ext`.
    pub in_place: bool,
    pub profile: ScrubProfile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            in_place: true,
            profile: ScrubProfile::default(),
        }
    }
}

impl Config {
    pub fn save_target(&self) -> SaveTarget {
        if self.in_place {
            SaveTarget::InPlace
        } else {
            SaveTarget::CleanCopy
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads `explicit` if given, else the default file if it exists, else the
/// defaults. An explicit path must exist.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }
    match default_config_path() {
        Some(path) if path.exists() => load_from_path(&path),
        _ => Ok(Config::default()),
    }
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}
