//! `packmux catalog` command

use anyhow::{Context, Result};
use serde::Serialize;

use super::Session;
use crate::cli::CatalogArgs;
use packmux::core::{CatalogQuery, Package};
use packmux::util::hash::short_checksum;

/// JSON view of a package.
#[derive(Serialize)]
struct PackageEntry<'a> {
    name: &'a str,
    version: Option<&'a str>,
    format: &'a str,
    path: Option<String>,
    checksum: Option<&'a str>,
}

impl<'a> PackageEntry<'a> {
    fn new(package: &'a dyn Package) -> Self {
        PackageEntry {
            name: package.name(),
            version: package.version(),
            format: package.format(),
            path: package.path().map(|p| p.display().to_string()),
            checksum: package.checksum(),
        }
    }
}

pub fn execute(session: &Session, args: CatalogArgs) -> Result<()> {
    let manager = session.manager(&args.format)?;

    let mut query = CatalogQuery::new().with_no_cache(args.no_cache);
    if let Some(name) = args.name {
        query = query.with_name(name);
    }
    if let Some(version) = args.version_req {
        query = query.with_version(version);
    }
    if let Some(source) = args.source {
        query = query.with_source(source);
    }

    let packages = manager.catalog(&session.ctx, &query)?;

    if args.json {
        let entries: Vec<_> = packages.iter().map(|p| PackageEntry::new(p.as_ref())).collect();
        let json = serde_json::to_string_pretty(&entries).context("failed to serialize catalog")?;
        println!("{}", json);
        return Ok(());
    }

    if packages.is_empty() {
        println!("No packages found");
        return Ok(());
    }

    for package in &packages {
        let version = package.version().unwrap_or("-");
        let checksum = package.checksum().map(short_checksum).unwrap_or("");
        println!(
            "{:<24} {:<12} {:<10} {}",
            package.name(),
            version,
            package.format(),
            checksum
        );
    }

    Ok(())
}
