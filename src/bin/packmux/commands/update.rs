//! `packmux update` command

use anyhow::Result;

use super::Session;
use crate::cli::UpdateArgs;

pub fn execute(session: &Session, args: UpdateArgs) -> Result<()> {
    let manager = session.manager(&args.format)?;

    manager.update(&session.ctx)?;

    eprintln!("    Updated catalog via {}", manager.format());
    Ok(())
}
