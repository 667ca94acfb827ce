//! PackageManager trait definition.
//!
//! The PackageManager trait is the contract every package format backend
//! implements, and the umbrella implements it too. Operations only; which
//! backend serves a request is decided by the registry and the umbrella.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::core::{CatalogQuery, Component, PackOptions, Package, UnpackOptions};
use crate::packmanager::context::OpContext;
use crate::packmanager::errors::PackManagerError;

/// Reserved format of the umbrella package manager.
pub const UMBRELLA_FORMAT: &str = "umbrella";

/// Key a package manager is registered under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextKey(String);

impl ContextKey {
    /// Key reserved for the umbrella.
    pub fn umbrella() -> Self {
        ContextKey(UMBRELLA_FORMAT.to_string())
    }

    /// Get the key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContextKey {
    fn from(s: &str) -> Self {
        ContextKey(s.to_string())
    }
}

impl From<String> for ContextKey {
    fn from(s: String) -> Self {
        ContextKey(s)
    }
}

/// A package manager for one package format.
///
/// Every operation may block on I/O. The `OpContext` carries cancellation
/// and a deadline; implementations should `check()` it between units of
/// work.
pub trait PackageManager: Send + Sync {
    /// Retrieve and store locally a cache of the upstream catalog.
    fn update(&self, ctx: &OpContext) -> Result<()>;

    /// Turn a component into distributable packages.
    ///
    /// A component made of sub-components yields one package per
    /// component unless `opts.flatten` is set.
    fn pack(
        &self,
        ctx: &OpContext,
        component: &dyn Component,
        opts: &PackOptions,
    ) -> Result<Vec<Box<dyn Package>>>;

    /// Turn a package back into usable components.
    fn unpack(
        &self,
        ctx: &OpContext,
        package: &dyn Package,
        opts: &UnpackOptions,
    ) -> Result<Vec<Box<dyn Component>>>;

    /// All packages known to the manager that match `query`.
    fn catalog(&self, ctx: &OpContext, query: &CatalogQuery) -> Result<Vec<Box<dyn Package>>>;

    /// Register a catalog source.
    fn add_source(&self, ctx: &OpContext, source: &str) -> Result<()>;

    /// Deregister a catalog source.
    fn remove_source(&self, ctx: &OpContext, source: &str) -> Result<()>;

    /// Succeeds when this manager, or one it delegates to, can handle
    /// `source`. Returns the manager that should be used for it.
    fn is_compatible(self: Arc<Self>, ctx: &OpContext, source: &str)
        -> Result<Arc<dyn PackageManager>>;

    /// Retrieve a sub-manager by format. Only aggregators have any.
    fn from(&self, format: &str) -> Result<Arc<dyn PackageManager>> {
        let _ = format;
        Err(PackManagerError::Unsupported {
            operation: "from",
            format: self.format().to_string(),
        }
        .into())
    }

    /// Name of the implementation, unique across the registry.
    fn format(&self) -> &str;
}

impl fmt::Debug for dyn PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageManager")
            .field("format", &self.format())
            .finish()
    }
}
