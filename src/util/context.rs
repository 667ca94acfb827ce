//! Global context for packmux operations.
//!
//! The GlobalContext carries the paths shared by every command: the working
//! directory and the packmux home directory.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "PACKMUX_HOME";

/// Project directories for packmux
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("org", "packmux", "packmux"));

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global packmux data
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(GlobalContext {
            cwd,
            home: default_home(),
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Use `home` instead of the platform data directory.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the packmux home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Directory holding the persistent state of the `format` package
    /// manager.
    pub fn state_dir(&self, format: &str) -> PathBuf {
        self.home.join(format)
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Get the project-local packmux directory.
    pub fn project_packmux_dir(&self) -> PathBuf {
        self.cwd.join(".packmux")
    }

    /// Get the project configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        self.project_packmux_dir().join("config.toml")
    }
}

fn default_home() -> PathBuf {
    if let Some(dirs) = PROJECT_DIRS.as_ref() {
        return dirs.data_dir().to_path_buf();
    }

    // Fallback to ~/.packmux
    BaseDirs::new()
        .map(|b| b.home_dir().join(".packmux"))
        .unwrap_or_else(|| PathBuf::from(".packmux"))
}
