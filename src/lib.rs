//! packmux - one package manager interface over many package formats
//!
//! Each package format is served by a backend implementing
//! [`PackageManager`]. Backends are registered into a [`ManagerRegistry`]
//! and the [`Umbrella`] presents them all as a single package manager:
//! every operation fans out to each backend in registry order.

pub mod backends;
pub mod core;
pub mod ops;
pub mod packmanager;
pub mod util;

/// Test utilities and mocks for packmux unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scriptable package manager and project
/// fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{CatalogQuery, Component, ComponentConfig, PackOptions, Package, Project, UnpackOptions};
pub use packmanager::{ManagerRegistry, OpContext, PackManagerError, PackageManager, Umbrella};
pub use util::context::GlobalContext;
