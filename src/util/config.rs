//! Configuration file support for packmux.
//!
//! Two configuration file locations are read:
//! - Global: `<home>/config.toml` - User-wide defaults
//! - Project: `.packmux/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// packmux configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package manager selection
    pub packmanager: PackManagerConfig,

    /// Tarball backend settings
    pub tarball: TarballConfig,

    /// Defaults for `packmux pack`
    pub pack: PackConfig,
}

/// Package manager selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackManagerConfig {
    /// Format used when `--format` is not given. Unset means every
    /// registered package manager.
    pub default_format: Option<String>,
}

/// Tarball backend settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TarballConfig {
    /// Sources registered with the backend at startup
    pub sources: Vec<String>,
}

/// Defaults for packing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Directory receiving packed archives
    pub output_dir: Option<PathBuf>,

    /// Always produce a single archive. Unset inherits the global setting.
    pub flatten: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist
    /// or can't be read.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.packmanager.default_format.is_some() {
            self.packmanager.default_format = other.packmanager.default_format;
        }

        for source in other.tarball.sources {
            if !self.tarball.sources.contains(&source) {
                self.tarball.sources.push(source);
            }
        }

        if other.pack.output_dir.is_some() {
            self.pack.output_dir = other.pack.output_dir;
        }
        if other.pack.flatten.is_some() {
            self.pack.flatten = other.pack.flatten;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.packmux/config.toml)
/// 2. Global config (<home>/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
