//! High-level operations.
//!
//! This module contains the implementation of packmux commands.

pub mod managers;
pub mod packmux_pack;
pub mod packmux_unpack;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

pub use managers::{init_managers, select_manager};
pub use packmux_pack::{pack_project, PackProjectOptions};
pub use packmux_unpack::{find_package, unpack_package};

/// Errors raised by command orchestration.
#[derive(Debug, Error)]
pub enum OpsError {
    #[error("package not found: {name}{}", .version.as_deref().map(|v| format!(" ({v})")).unwrap_or_default())]
    PackageNotFound {
        name: String,
        version: Option<String>,
    },
}

impl OpsError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            OpsError::PackageNotFound { .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::PACKAGE_NOT_FOUND)
            }
        }
    }
}
