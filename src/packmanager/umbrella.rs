//! The umbrella package manager.
//!
//! `Umbrella` implements `PackageManager` by fanning every call out to all
//! registered package managers, one at a time, in registry order:
//!
//! - the first error aborts the fan-out and is returned unchanged; results
//!   gathered from earlier managers are dropped
//! - list results (`pack`, `unpack`, `catalog`) are concatenated in order,
//!   without de-duplication
//! - `is_compatible` returns the first manager that accepts the source
//!
//! The umbrella never inspects the `OpContext`; a cancelled context only
//! stops the fan-out once a backend fails because of it.

use std::sync::Arc;

use anyhow::Result;

use crate::core::{CatalogQuery, Component, PackOptions, Package, UnpackOptions};
use crate::packmanager::context::OpContext;
use crate::packmanager::errors::PackManagerError;
use crate::packmanager::manager::{PackageManager, UMBRELLA_FORMAT};
use crate::packmanager::registry::ManagerRegistry;

/// A package manager that manipulates every registered package manager at
/// once.
#[derive(Debug, Clone)]
pub struct Umbrella {
    registry: Arc<ManagerRegistry>,
}

impl Umbrella {
    /// Create an umbrella over a fully populated registry.
    pub fn new(registry: Arc<ManagerRegistry>) -> Self {
        Umbrella { registry }
    }

    /// The registry this umbrella fans out over.
    pub fn registry(&self) -> &ManagerRegistry {
        &self.registry
    }
}

impl PackageManager for Umbrella {
    fn update(&self, ctx: &OpContext) -> Result<()> {
        for (_, manager) in self.registry.snapshot() {
            tracing::trace!("Updating catalog via {}...", manager.format());
            manager.update(ctx)?;
        }

        Ok(())
    }

    fn pack(
        &self,
        ctx: &OpContext,
        component: &dyn Component,
        opts: &PackOptions,
    ) -> Result<Vec<Box<dyn Package>>> {
        let mut packages = Vec::new();

        for (_, manager) in self.registry.snapshot() {
            tracing::trace!("Packing {} via {}...", component.name(), manager.format());
            let more = manager.pack(ctx, component, opts)?;
            packages.extend(more);
        }

        Ok(packages)
    }

    fn unpack(
        &self,
        ctx: &OpContext,
        package: &dyn Package,
        opts: &UnpackOptions,
    ) -> Result<Vec<Box<dyn Component>>> {
        let mut components = Vec::new();

        for (_, manager) in self.registry.snapshot() {
            tracing::trace!("Unpacking {} via {}...", package.name(), manager.format());
            let more = manager.unpack(ctx, package, opts)?;
            components.extend(more);
        }

        Ok(components)
    }

    fn catalog(&self, ctx: &OpContext, query: &CatalogQuery) -> Result<Vec<Box<dyn Package>>> {
        let mut packages = Vec::new();

        for (_, manager) in self.registry.snapshot() {
            tracing::trace!("Querying catalog via {}...", manager.format());
            let more = manager.catalog(ctx, query)?;
            packages.extend(more);
        }

        Ok(packages)
    }

    fn add_source(&self, ctx: &OpContext, source: &str) -> Result<()> {
        for (_, manager) in self.registry.snapshot() {
            tracing::trace!("Adding source {} via {}...", source, manager.format());
            manager.add_source(ctx, source)?;
        }

        Ok(())
    }

    fn remove_source(&self, ctx: &OpContext, source: &str) -> Result<()> {
        for (_, manager) in self.registry.snapshot() {
            tracing::trace!("Removing source {} via {}...", source, manager.format());
            manager.remove_source(ctx, source)?;
        }

        Ok(())
    }

    fn is_compatible(
        self: Arc<Self>,
        ctx: &OpContext,
        source: &str,
    ) -> Result<Arc<dyn PackageManager>> {
        for (_, manager) in self.registry.snapshot() {
            let format = manager.format().to_string();
            match manager.is_compatible(ctx, source) {
                Ok(compatible) => {
                    tracing::debug!("Source {} is handled by {}", source, compatible.format());
                    return Ok(compatible);
                }
                Err(e) => {
                    tracing::trace!("{} cannot handle source {}: {:#}", format, source, e);
                }
            }
        }

        Err(PackManagerError::NoCompatibleManager(source.to_string()).into())
    }

    fn from(&self, format: &str) -> Result<Arc<dyn PackageManager>> {
        self.registry
            .snapshot()
            .into_iter()
            .map(|(_, manager)| manager)
            .find(|manager| manager.format() == format)
            .ok_or_else(|| PackManagerError::UnknownPackageManager(format.to_string()).into())
    }

    fn format(&self) -> &str {
        UMBRELLA_FORMAT
    }
}
