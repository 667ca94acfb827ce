//! Catalog queries.
//!
//! A `CatalogQuery` is handed unchanged to every package manager. The
//! umbrella never looks inside it; the `matches_*` helpers exist so that
//! backends filter consistently.

use glob::Pattern;
use semver::{Version, VersionReq};

/// Filter for `PackageManager::catalog`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Package name or glob pattern (e.g. `lib*`)
    pub name: Option<String>,

    /// Version requirement (e.g. `^1.2`) or an exact version string
    pub version: Option<String>,

    /// Only consider packages coming from this source
    pub source: Option<String>,

    /// Skip any local cache and ask the sources directly
    pub no_cache: bool,
}

impl CatalogQuery {
    /// Create a query matching everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict by name or glob pattern.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict by version requirement.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Restrict to a single source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Bypass cached catalogs.
    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    /// Check a package name against the name filter.
    ///
    /// Invalid glob patterns fall back to exact comparison.
    pub fn matches_name(&self, name: &str) -> bool {
        match &self.name {
            None => true,
            Some(wanted) => match Pattern::new(wanted) {
                Ok(pattern) => pattern.matches(name),
                Err(_) => wanted == name,
            },
        }
    }

    /// Check a package version against the version filter.
    ///
    /// Packages without a version only match an empty filter. A filter that
    /// is not a valid semver requirement, or a version that is not valid
    /// semver, is compared as a plain string.
    pub fn matches_version(&self, version: Option<&str>) -> bool {
        let wanted = match &self.version {
            None => return true,
            Some(wanted) => wanted,
        };
        let version = match version {
            None => return false,
            Some(version) => version,
        };

        match (VersionReq::parse(wanted), Version::parse(version)) {
            (Ok(req), Ok(version)) => req.matches(&version),
            _ => wanted == version,
        }
    }

    /// Check a package source against the source filter.
    pub fn matches_source(&self, source: Option<&str>) -> bool {
        match &self.source {
            None => true,
            Some(wanted) => source == Some(wanted.as_str()),
        }
    }
}
