//! Package managers: the backend contract, the registry, and the umbrella.
//!
//! Every package format is served by one `PackageManager`. Backends are
//! registered into a `ManagerRegistry` at startup; the `Umbrella` then
//! presents the whole registry as a single package manager.

pub mod context;
pub mod errors;
pub mod manager;
pub mod registry;
pub mod umbrella;

pub use context::OpContext;
pub use errors::PackManagerError;
pub use manager::{ContextKey, PackageManager, UMBRELLA_FORMAT};
pub use registry::ManagerRegistry;
pub use umbrella::Umbrella;
