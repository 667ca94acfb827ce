//! `packmux pack` command

use anyhow::Result;

use super::Session;
use crate::cli::PackArgs;
use packmux::core::PackOptions;
use packmux::ops::{pack_project, PackProjectOptions};
use packmux::util::fs::absolutize;

pub fn execute(session: &Session, args: PackArgs) -> Result<()> {
    let manager = session.manager(&args.format)?;
    let cwd = session.gctx.cwd();

    let path = args
        .path
        .map(|p| absolutize(cwd, &p))
        .unwrap_or_else(|| cwd.to_path_buf());

    let mut pack = PackOptions::new()
        .with_flatten(args.flatten || session.config.pack.flatten.unwrap_or(false))
        .with_overwrite(args.overwrite);
    if let Some(output) = args.output.or_else(|| session.config.pack.output_dir.clone()) {
        pack = pack.with_output_dir(absolutize(cwd, &output));
    }

    let opts = PackProjectOptions {
        name: args.name,
        version: args.version_override,
        pack,
    };

    let packages = pack_project(manager.as_ref(), &session.ctx, &path, &opts)?;

    for package in &packages {
        match package.path() {
            Some(path) => eprintln!("     Packed {} ({})", package.name(), path.display()),
            None => eprintln!("     Packed {}", package.name()),
        }
    }

    Ok(())
}
