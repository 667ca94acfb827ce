//! `packmux detect` command

use std::sync::Arc;

use anyhow::Result;

use super::Session;
use crate::cli::DetectArgs;
use packmux::packmanager::PackageManager;

pub fn execute(session: &Session, args: DetectArgs) -> Result<()> {
    let manager = Arc::clone(&session.umbrella).is_compatible(&session.ctx, &args.source)?;

    println!("{}", manager.format());
    Ok(())
}
