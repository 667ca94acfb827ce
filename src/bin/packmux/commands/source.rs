//! `packmux source` command
//!
//! Add and remove catalog sources.

use anyhow::Result;

use super::Session;
use crate::cli::{SourceArgs, SourceCommands};

pub fn execute(session: &Session, args: SourceArgs) -> Result<()> {
    match args.command {
        SourceCommands::Add(target) => {
            let manager = session.manager(&target.format)?;
            manager.add_source(&session.ctx, &target.source)?;
            eprintln!("      Added source {}", target.source);
        }
        SourceCommands::Remove(target) => {
            let manager = session.manager(&target.format)?;
            manager.remove_source(&session.ctx, &target.source)?;
            eprintln!("    Removed source {}", target.source);
        }
    }

    Ok(())
}
