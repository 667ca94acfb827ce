//! Options for packing and unpacking.
//!
//! The umbrella passes these through untouched; each package manager
//! decides which fields apply to it.

use std::path::{Path, PathBuf};

/// Options altering `PackageManager::pack`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackOptions {
    /// Produce a single package even when the component has sub-components
    pub flatten: bool,

    /// Directory receiving the produced artifacts (defaults to the cwd)
    pub output_dir: Option<PathBuf>,

    /// Replace artifacts that already exist
    pub overwrite: bool,
}

impl PackOptions {
    /// Create default pack options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set flatten mode.
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set overwrite mode.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// The output directory, falling back to the current directory.
    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }
}

/// Options altering `PackageManager::unpack`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackOptions {
    /// Directory the package is unpacked under (defaults to the cwd)
    pub workdir: Option<PathBuf>,

    /// Replace a destination that already has content
    pub overwrite: bool,
}

impl UnpackOptions {
    /// Create default unpack options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working directory.
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Set overwrite mode.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// The working directory, falling back to the current directory.
    pub fn workdir(&self) -> &Path {
        self.workdir.as_deref().unwrap_or_else(|| Path::new("."))
    }
}
