//! Package manager error types and diagnostics.

use thiserror::Error;

use crate::packmanager::manager::ContextKey;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Errors raised by the registry, the umbrella, and operation contexts.
///
/// Errors coming from an individual package manager are not wrapped: they
/// propagate through the umbrella exactly as the backend returned them.
#[derive(Debug, Error)]
pub enum PackManagerError {
    #[error("package manager already registered: {format}")]
    AlreadyRegistered { key: ContextKey, format: String },

    #[error("unknown package manager: {0}")]
    UnknownPackageManager(String),

    #[error("cannot find compatible package manager for source: {0}")]
    NoCompatibleManager(String),

    #[error("{operation} is not supported by the {format} package manager")]
    Unsupported {
        operation: &'static str,
        format: String,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation deadline exceeded")]
    DeadlineExceeded,
}

impl PackManagerError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            PackManagerError::AlreadyRegistered { key, format } => {
                Diagnostic::error(format!("package manager already registered: {}", format))
                    .with_context(format!("registry key `{}` is already taken", key))
            }

            PackManagerError::UnknownPackageManager(format) => {
                Diagnostic::error(format!("unknown package manager: {}", format))
                    .with_suggestion(suggestions::UNKNOWN_FORMAT)
            }

            PackManagerError::NoCompatibleManager(source) => Diagnostic::error(format!(
                "cannot find compatible package manager for source: {}",
                source
            ))
            .with_context("every registered package manager rejected the source")
            .with_suggestion(suggestions::NO_COMPATIBLE_MANAGER),

            PackManagerError::Unsupported { operation, format } => Diagnostic::error(format!(
                "{} is not supported by the {} package manager",
                operation, format
            ))
            .with_suggestion("Run the command without --format to use every package manager"),

            PackManagerError::Cancelled => Diagnostic::error("operation cancelled"),

            PackManagerError::DeadlineExceeded => Diagnostic::error("operation deadline exceeded")
                .with_suggestion(suggestions::DEADLINE_EXCEEDED),
        }
    }
}
