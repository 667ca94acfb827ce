//! Command implementations

pub mod catalog;
pub mod completions;
pub mod detect;
pub mod formats;
pub mod pack;
pub mod source;
pub mod unpack;
pub mod update;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::cli::{Cli, FormatArg};
use packmux::ops::{init_managers, select_manager};
use packmux::packmanager::{OpContext, PackageManager, Umbrella};
use packmux::util::config::load_config;
use packmux::util::{Config, GlobalContext};

/// State shared by every command: paths, configuration, the operation
/// context and the umbrella over all registered package managers.
pub struct Session {
    pub gctx: GlobalContext,
    pub config: Config,
    pub ctx: OpContext,
    pub umbrella: Arc<Umbrella>,
}

impl Session {
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut gctx = GlobalContext::new()?;
        if let Some(home) = &cli.home {
            gctx = gctx.with_home(home.clone());
        }
        tracing::debug!("Using packmux home {}", gctx.home().display());

        let config = load_config(&gctx.config_path(), &gctx.project_config_path());

        let mut ctx = OpContext::new();
        if let Some(seconds) = cli.timeout {
            ctx = ctx.with_timeout(Duration::from_secs(seconds));
        }

        let registry = init_managers(&gctx, &config, &ctx)?;
        let umbrella = Arc::new(Umbrella::new(Arc::new(registry)));

        Ok(Session {
            gctx,
            config,
            ctx,
            umbrella,
        })
    }

    /// The package manager a command should use: `--format` if given, the
    /// configured default otherwise, every package manager as a last resort.
    pub fn manager(&self, format: &FormatArg) -> Result<Arc<dyn PackageManager>> {
        let format = format
            .format
            .as_deref()
            .or(self.config.packmanager.default_format.as_deref());
        select_manager(&self.umbrella, format)
    }
}
