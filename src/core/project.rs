//! Projects - a working directory, its manifest files, and its build targets.
//!
//! Projects are described by an optional `packmux.toml`:
//!
//! ```toml
//! [project]
//! name = "helloworld"
//! version = "0.1.0"
//! format = "tarball"
//!
//! [[targets]]
//! arch = "x86_64"
//! plat = "qemu"
//! ```
//!
//! `Project::normalize` must run before a project is handed to a package
//! manager: it resolves every path and injects implicit defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::core::component::{Component, ComponentType};
use crate::core::target::{Architecture, Platform, Target};
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::absolutize;

/// Project file name.
pub const PROJECT_FILE: &str = "packmux.toml";

/// Directory, relative to the project root, holding built kernel images.
pub const BUILD_DIR: &str = "build";

static PROJECT_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[a-z0-9_-]").expect("valid project name regex"));

/// Error loading or normalizing a project.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read project file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse project file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to resolve working directory {}: {source}", .path.display())]
    WorkingDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot derive a project name from {}", .0.display())]
    NoName(PathBuf),
}

impl ProjectError {
    /// Convert to a user-friendly diagnostic pointing at the offending path.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ProjectError::Read { path, source } => Diagnostic::error("failed to read project file")
                .with_location(path)
                .with_context(source.to_string()),

            ProjectError::Parse { path, source } => Diagnostic::error("failed to parse project file")
                .with_location(path)
                .with_context(source.message().to_string()),

            ProjectError::WorkingDir { path, source } => {
                Diagnostic::error("failed to resolve working directory")
                    .with_location(path)
                    .with_context(source.to_string())
            }

            ProjectError::NoName(path) => Diagnostic::error("cannot derive a project name")
                .with_location(path)
                .with_suggestion(suggestions::PROJECT_NAME),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProjectFile {
    project: ProjectSection,
    targets: Vec<TargetSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProjectSection {
    name: Option<String>,
    version: Option<String>,
    format: Option<String>,
    manifests: Vec<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct TargetSpec {
    #[serde(default)]
    name: Option<String>,
    arch: String,
    plat: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    kernel: Option<PathBuf>,
    #[serde(default)]
    kernel_dbg: Option<PathBuf>,
    #[serde(default)]
    command: Vec<String>,
    #[serde(default)]
    kconfig: BTreeMap<String, String>,
}

impl TargetSpec {
    fn into_target(self) -> Target {
        let mut target = Target::new(
            self.name.unwrap_or_default(),
            Architecture::new(self.arch),
            Platform::new(self.plat),
        )
        .with_command(self.command);

        for (key, value) in self.kconfig {
            target = target.with_kconfig(key, value);
        }
        if let Some(format) = self.format {
            target = target.with_format(format);
        }
        if let Some(kernel) = self.kernel {
            target = target.with_kernel(kernel);
        }
        if let Some(kernel_dbg) = self.kernel_dbg {
            target = target.with_kernel_dbg(kernel_dbg);
        }
        target
    }
}

/// A project rooted at a working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    name: String,
    version: Option<String>,
    working_dir: PathBuf,
    manifests: Vec<PathBuf>,
    targets: Vec<Target>,
    default_format: Option<String>,
}

impl Project {
    /// Create an empty project rooted at `working_dir`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Project {
            working_dir: working_dir.into(),
            ..Default::default()
        }
    }

    /// Load a project from `dir`, reading `packmux.toml` when present.
    ///
    /// The result is not normalized.
    pub fn load(dir: &Path) -> Result<Self, ProjectError> {
        let mut project = Project::new(dir);
        let path = dir.join(PROJECT_FILE);
        if !path.exists() {
            return Ok(project);
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| ProjectError::Read {
            path: path.clone(),
            source,
        })?;
        let file: ProjectFile = toml::from_str(&contents).map_err(|source| ProjectError::Parse {
            path: path.clone(),
            source,
        })?;

        project.name = file.project.name.unwrap_or_default();
        project.version = file.project.version;
        project.default_format = file.project.format;
        project.manifests.push(path);
        project.manifests.extend(file.project.manifests);
        project.targets = file
            .targets
            .into_iter()
            .map(TargetSpec::into_target)
            .collect();

        Ok(project)
    }

    /// Set the project name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the project version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the format injected into targets that don't name one.
    pub fn with_default_format(mut self, format: impl Into<String>) -> Self {
        self.default_format = Some(format.into());
        self
    }

    /// Add a manifest file.
    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifests.push(path.into());
        self
    }

    /// Add a build target.
    pub fn with_target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    /// Project working directory.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Manifest files describing the project.
    pub fn manifests(&self) -> &[PathBuf] {
        &self.manifests
    }

    /// Build targets.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Format injected into targets without one.
    pub fn default_format(&self) -> Option<&str> {
        self.default_format.as_deref()
    }

    /// Resolve every path and inject implicit defaults.
    ///
    /// - the working directory becomes absolute
    /// - manifests and kernel paths resolve against the working directory
    /// - a missing name is derived from the working directory
    /// - targets inherit the project name and default format
    /// - missing kernel paths are filled in when `build/<kernel name>` and
    ///   `build/<kernel name>.dbg` exist
    pub fn normalize(&mut self) -> Result<(), ProjectError> {
        let working_dir =
            std::path::absolute(&self.working_dir).map_err(|source| ProjectError::WorkingDir {
                path: self.working_dir.clone(),
                source,
            })?;
        self.working_dir = working_dir;

        let base = self.working_dir.clone();
        self.manifests = self
            .manifests
            .iter()
            .map(|m| absolutize(&base, m))
            .collect();

        if self.name.is_empty() {
            let derived = self
                .working_dir
                .file_name()
                .map(|n| normalize_project_name(&n.to_string_lossy()))
                .unwrap_or_default();
            if derived.is_empty() {
                return Err(ProjectError::NoName(self.working_dir.clone()));
            }
            self.name = derived;
        }

        for target in &mut self.targets {
            if target.name().is_empty() {
                target.set_name(self.name.clone());
            }
            if target.format().is_none() {
                if let Some(format) = &self.default_format {
                    target.set_format(format.clone());
                }
            }
            target.map_paths(|p| absolutize(&base, p));

            let build_dir = base.join(BUILD_DIR);
            if target.kernel().is_none() {
                if let Ok(kernel_name) = target.kernel_name() {
                    let candidate = build_dir.join(kernel_name);
                    if candidate.is_file() {
                        tracing::debug!(
                            "Found {} kernel {}",
                            target.arch_plat_string(),
                            candidate.display()
                        );
                        *target = target.clone().with_kernel(candidate);
                    }
                }
            }
            if target.kernel_dbg().is_none() {
                if let Ok(dbg_name) = target.kernel_dbg_name() {
                    let candidate = build_dir.join(dbg_name);
                    if candidate.is_file() {
                        *target = target.clone().with_kernel_dbg(candidate);
                    }
                }
            }
        }

        Ok(())
    }
}

impl Component for Project {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.working_dir)
    }

    fn component_type(&self) -> ComponentType {
        ComponentType::App
    }

    fn children(&self) -> Vec<&dyn Component> {
        self.targets.iter().map(|t| t as &dyn Component).collect()
    }
}

/// Turn an arbitrary string into a valid project name: lowercase, only
/// `[a-z0-9_-]`, no leading `_` or `-`.
pub fn normalize_project_name(s: &str) -> String {
    let lower = s.to_lowercase();
    let kept: String = PROJECT_NAME_CHARS
        .find_iter(&lower)
        .map(|m| m.as_str())
        .collect();
    kept.trim_start_matches(['_', '-']).to_string()
}
