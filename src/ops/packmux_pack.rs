//! Implementation of `packmux pack`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::{Component, PackOptions, Package, Project};
use crate::packmanager::{OpContext, PackageManager};

/// Options for packing a project.
#[derive(Debug, Clone, Default)]
pub struct PackProjectOptions {
    /// Override the project name
    pub name: Option<String>,

    /// Override the project version
    pub version: Option<String>,

    /// Options handed to the package manager
    pub pack: PackOptions,
}

/// Load the project at `path`, normalize it and pack it with `manager`.
pub fn pack_project(
    manager: &dyn PackageManager,
    ctx: &OpContext,
    path: &Path,
    opts: &PackProjectOptions,
) -> Result<Vec<Box<dyn Package>>> {
    let mut project = Project::load(path)?;
    if let Some(name) = &opts.name {
        project = project.with_name(name.clone());
    }
    if let Some(version) = &opts.version {
        project = project.with_version(version.clone());
    }
    project.normalize()?;

    tracing::info!(
        "Packing {} from {} via {}",
        project.name(),
        project.working_dir().display(),
        manager.format()
    );

    manager
        .pack(ctx, &project, &opts.pack)
        .with_context(|| format!("failed to pack {}", project.name()))
}
