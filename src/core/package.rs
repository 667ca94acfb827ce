//! Packages - the distributable artifacts produced by `pack`.

use std::fmt;
use std::path::Path;

/// A distributable artifact.
///
/// Only `name()` and `format()` are required. The remaining accessors let a
/// backend hand enough information back to itself to unpack later.
pub trait Package: fmt::Debug + Send + Sync {
    /// Name of the package.
    fn name(&self) -> &str;

    /// Format of the package manager that produced it.
    fn format(&self) -> &str;

    /// Version of the package, if known.
    fn version(&self) -> Option<&str> {
        None
    }

    /// Local path of the artifact, if it exists on disk.
    fn path(&self) -> Option<&Path> {
        None
    }

    /// Content checksum (hex encoded sha256), if computed.
    fn checksum(&self) -> Option<&str> {
        None
    }
}

/// Render a package as `name@version (format)` for display.
pub fn package_id(package: &dyn Package) -> String {
    match package.version() {
        Some(version) => format!("{}@{} ({})", package.name(), version, package.format()),
        None => format!("{} ({})", package.name(), package.format()),
    }
}
