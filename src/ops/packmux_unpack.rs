//! Implementation of `packmux unpack`.

use anyhow::{bail, Result};
use semver::Version;

use crate::core::{CatalogQuery, Component, Package, UnpackOptions};
use crate::ops::OpsError;
use crate::packmanager::{OpContext, PackageManager};

/// Find the highest-versioned catalog entry matching `name` and `version`.
///
/// Packages whose version is not valid semver rank below every valid one.
pub fn find_package(
    manager: &dyn PackageManager,
    ctx: &OpContext,
    name: &str,
    version: Option<&str>,
) -> Result<Box<dyn Package>> {
    let mut query = CatalogQuery::new().with_name(name);
    if let Some(version) = version {
        query = query.with_version(version);
    }

    manager
        .catalog(ctx, &query)?
        .into_iter()
        .max_by(|a, b| version_key(&**a).cmp(&version_key(&**b)))
        .ok_or_else(|| {
            OpsError::PackageNotFound {
                name: name.to_string(),
                version: version.map(str::to_string),
            }
            .into()
        })
}

fn version_key(package: &dyn Package) -> Option<Version> {
    package.version().and_then(|v| Version::parse(v).ok())
}

/// Unpack `package`, failing when no package manager produced anything.
pub fn unpack_package(
    manager: &dyn PackageManager,
    ctx: &OpContext,
    package: &dyn Package,
    opts: &UnpackOptions,
) -> Result<Vec<Box<dyn Component>>> {
    let components = manager.unpack(ctx, package, opts)?;
    if components.is_empty() {
        bail!(
            "no package manager could unpack {} ({} format)",
            package.name(),
            package.format()
        );
    }

    for component in &components {
        match component.path() {
            Some(path) => tracing::info!("Unpacked {} into {}", component.name(), path.display()),
            None => tracing::info!("Unpacked {}", component.name()),
        }
    }

    Ok(components)
}
