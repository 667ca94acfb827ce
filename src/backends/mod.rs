//! Package manager implementations.
//!
//! Each backend serves one package format and is registered into the
//! `ManagerRegistry` by `ops::init_managers`.

pub mod tarball;

pub use tarball::{TarballManager, TarballPackage, TARBALL_FORMAT};
