//! Package manager setup and selection.

use std::sync::Arc;

use anyhow::Result;

use crate::backends::{TarballManager, TARBALL_FORMAT};
use crate::packmanager::{ManagerRegistry, OpContext, PackageManager, Umbrella, UMBRELLA_FORMAT};
use crate::util::{Config, GlobalContext};

/// Build the registry of every available package manager.
///
/// Sources listed in the configuration are registered with their backend
/// first; a source that cannot be registered is reported and skipped.
pub fn init_managers(gctx: &GlobalContext, config: &Config, ctx: &OpContext) -> Result<ManagerRegistry> {
    let mut registry = ManagerRegistry::new();

    let tarball = Arc::new(TarballManager::new(gctx.state_dir(TARBALL_FORMAT)));
    for source in &config.tarball.sources {
        if let Err(e) = tarball.add_source(ctx, source) {
            tracing::warn!("Ignoring configured tarball source {}: {:#}", source, e);
        }
    }
    registry.register(TARBALL_FORMAT, tarball)?;

    Ok(registry)
}

/// The package manager serving `format`, or the umbrella when no format is
/// requested.
pub fn select_manager(umbrella: &Arc<Umbrella>, format: Option<&str>) -> Result<Arc<dyn PackageManager>> {
    match format {
        None | Some(UMBRELLA_FORMAT) => {
            let manager: Arc<dyn PackageManager> = umbrella.clone();
            Ok(manager)
        }
        Some(format) => umbrella.from(format),
    }
}
