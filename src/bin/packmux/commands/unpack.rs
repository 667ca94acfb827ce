//! `packmux unpack` command

use anyhow::Result;

use super::Session;
use crate::cli::UnpackArgs;
use packmux::core::{package_id, UnpackOptions};
use packmux::ops::{find_package, unpack_package};
use packmux::util::fs::absolutize;

pub fn execute(session: &Session, args: UnpackArgs) -> Result<()> {
    let manager = session.manager(&args.format)?;
    let cwd = session.gctx.cwd();

    let package = find_package(
        manager.as_ref(),
        &session.ctx,
        &args.name,
        args.version_req.as_deref(),
    )?;

    let workdir = args
        .into
        .map(|dir| absolutize(cwd, &dir))
        .unwrap_or_else(|| cwd.to_path_buf());
    let opts = UnpackOptions::new()
        .with_workdir(workdir)
        .with_overwrite(args.overwrite);

    let components = unpack_package(manager.as_ref(), &session.ctx, package.as_ref(), &opts)?;

    eprintln!("   Unpacked {}", package_id(package.as_ref()));
    for component in &components {
        if let Some(path) = component.path() {
            println!("{}", path.display());
        }
    }

    Ok(())
}
