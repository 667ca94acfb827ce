//! Tarball package manager.
//!
//! Packages are gzip-compressed tar archives found in local sources: a
//! directory holding archives, or a single archive file. `update` scans the
//! sources and caches what it found; `catalog` answers from that cache.

pub mod archive;
pub mod store;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use crate::core::{CatalogQuery, Component, ComponentConfig, PackOptions, Package, UnpackOptions};
use crate::packmanager::{OpContext, PackageManager};
use crate::util::fs::{ensure_dir, is_empty_dir, normalize_path};
use crate::util::hash::{sha256_file, short_checksum};

use archive::{archive_file_name, extract_archive, is_archive, parse_archive_name, ArchiveWriter};
pub use store::{source_path, Store, TarballPackage, TARBALL_FORMAT};

/// Package manager for local tarballs.
#[derive(Debug)]
pub struct TarballManager {
    store: Store,
    lock: Mutex<()>,
}

impl TarballManager {
    /// Create a manager keeping its state in `state_dir`.
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        TarballManager {
            store: Store::new(state_dir),
            lock: Mutex::new(()),
        }
    }

    /// Registered sources.
    pub fn sources(&self) -> Result<Vec<String>> {
        self.store.load_sources()
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Scan every registered source.
    fn scan_sources(&self, ctx: &OpContext) -> Result<Vec<TarballPackage>> {
        let mut packages = Vec::new();

        for source in self.store.load_sources()? {
            ctx.check()?;

            let Some(path) = source_path(&source) else {
                tracing::warn!("Skipping source {}: only local paths are supported", source);
                continue;
            };
            if !path.exists() {
                tracing::warn!("Skipping source {}: {} does not exist", source, path.display());
                continue;
            }

            let found = scan_source(ctx, &source, &path)?;
            tracing::debug!("Found {} package(s) in {}", found.len(), source);
            packages.extend(found);
        }

        Ok(packages)
    }

    /// Find the archive behind `package`.
    fn locate(&self, ctx: &OpContext, package: &dyn Package) -> Result<PathBuf> {
        if let Some(path) = package.path() {
            return Ok(path.to_path_buf());
        }

        let packages = match self.store.load_index()? {
            Some(packages) => packages,
            None => self.scan_sources(ctx)?,
        };
        packages
            .into_iter()
            .find(|p| p.name == package.name() && p.version.as_deref() == package.version())
            .map(|p| p.path)
            .with_context(|| format!("no archive found for package {}", package.name()))
    }

    /// Pack `component` and each of its descendants into separate archives.
    fn pack_tree(
        &self,
        ctx: &OpContext,
        component: &dyn Component,
        inherited_version: Option<&str>,
        out: &Output,
        used: &mut HashSet<String>,
        packed: &mut Vec<TarballPackage>,
    ) -> Result<()> {
        ctx.check()?;
        let version = component.version().or(inherited_version);
        let children = component.children();

        match component.path() {
            Some(path) => {
                let root = canonical_root(component, path)?;
                let nested: Vec<PathBuf> = children
                    .iter()
                    .filter_map(|c| c.path())
                    .map(normalize_path)
                    .filter(|p| p.starts_with(&root) && *p != root)
                    .collect();

                let name = unique_name(component, used)?;
                let package = out.write(&name, version, |writer| {
                    let skip = |p: &Path| out.skips(p) || nested.iter().any(|n| p.starts_with(n));
                    writer.append_path(ctx, &root, Path::new(""), &skip)
                })?;
                packed.push(package);
            }
            None => {
                tracing::debug!("Nothing to pack for {}: no path", component.name());
            }
        }

        for child in children {
            self.pack_tree(ctx, child, version, out, used, packed)?;
        }

        Ok(())
    }

    /// Pack `component` and every descendant into one archive.
    fn pack_flat(
        &self,
        ctx: &OpContext,
        component: &dyn Component,
        root_path: &Path,
        out: &Output,
    ) -> Result<TarballPackage> {
        let root = canonical_root(component, root_path)?;
        let mut descendants = Vec::new();
        collect_descendants(component, &mut descendants);

        out.write(component.name(), component.version(), |writer| {
            let skip = |p: &Path| out.skips(p);
            writer.append_path(ctx, &root, Path::new(""), &skip)?;

            let mut included = vec![root.clone()];
            for descendant in descendants {
                let Some(path) = descendant.path() else {
                    continue;
                };
                let path = normalize_path(path);
                if included.iter().any(|i| path.starts_with(i)) {
                    continue;
                }

                writer.append_path(ctx, &path, Path::new(descendant.name()), &skip)?;
                included.push(path);
            }
            Ok(())
        })
    }
}

impl PackageManager for TarballManager {
    fn update(&self, ctx: &OpContext) -> Result<()> {
        let _guard = self.guard();

        let packages = self.scan_sources(ctx)?;
        self.store.save_index(&packages)?;

        tracing::info!("Indexed {} tarball package(s)", packages.len());
        Ok(())
    }

    fn pack(
        &self,
        ctx: &OpContext,
        component: &dyn Component,
        opts: &PackOptions,
    ) -> Result<Vec<Box<dyn Package>>> {
        let Some(root_path) = component.path() else {
            bail!("cannot pack {}: component has no path", component.name());
        };
        let out = Output::prepare(opts)?;

        let packed = if opts.flatten {
            vec![self.pack_flat(ctx, component, root_path, &out)?]
        } else {
            let mut packed = Vec::new();
            let mut used = HashSet::new();
            self.pack_tree(ctx, component, None, &out, &mut used, &mut packed)?;
            packed
        };

        Ok(packed
            .into_iter()
            .map(|p| Box::new(p) as Box<dyn Package>)
            .collect())
    }

    fn unpack(
        &self,
        ctx: &OpContext,
        package: &dyn Package,
        opts: &UnpackOptions,
    ) -> Result<Vec<Box<dyn Component>>> {
        if package.format() != TARBALL_FORMAT {
            tracing::debug!("Not unpacking {}: format {}", package.name(), package.format());
            return Ok(Vec::new());
        }

        let archive = self.locate(ctx, package)?;
        if let Some(expected) = package.checksum() {
            let actual = sha256_file(&archive)?;
            if actual != expected {
                bail!(
                    "checksum mismatch for {}: expected {}, found {}",
                    archive.display(),
                    short_checksum(expected),
                    short_checksum(&actual)
                );
            }
        }

        let dest = opts.workdir().join(package.name());
        if !opts.overwrite && !is_empty_dir(&dest) {
            bail!(
                "cannot unpack {} into {}: directory is not empty (use --overwrite)",
                package.name(),
                dest.display()
            );
        }

        let entries = extract_archive(ctx, &archive, &dest, opts.overwrite)?;
        tracing::info!("Unpacked {} ({} entries) into {}", package.name(), entries, dest.display());

        let mut component = ComponentConfig::new(package.name())
            .with_path(dest)
            .with_source(archive.display().to_string());
        if let Some(version) = package.version() {
            component = component.with_version(version);
        }
        Ok(vec![Box::new(component)])
    }

    fn catalog(&self, ctx: &OpContext, query: &CatalogQuery) -> Result<Vec<Box<dyn Package>>> {
        // Compare against sources in the form `add_source` stores them.
        let query = CatalogQuery {
            source: query.source.as_deref().map(canonical_source).transpose()?,
            ..query.clone()
        };

        let cached = if query.no_cache {
            None
        } else {
            self.store.load_index()?
        };
        let packages = match cached {
            Some(packages) => packages,
            None => {
                let _guard = self.guard();
                let packages = self.scan_sources(ctx)?;
                self.store.save_index(&packages)?;
                packages
            }
        };

        Ok(packages
            .into_iter()
            .filter(|p| {
                query.matches_name(&p.name)
                    && query.matches_version(p.version.as_deref())
                    && query.matches_source(Some(p.source.as_str()))
            })
            .map(|p| Box::new(p) as Box<dyn Package>)
            .collect())
    }

    fn add_source(&self, ctx: &OpContext, source: &str) -> Result<()> {
        ctx.check()?;
        let _guard = self.guard();

        let source = canonical_source(source)?;
        let mut sources = self.store.load_sources()?;
        if sources.contains(&source) {
            tracing::debug!("Source {} is already registered", source);
            return Ok(());
        }

        sources.push(source.clone());
        self.store.save_sources(&sources)?;
        tracing::info!("Added tarball source {}", source);
        Ok(())
    }

    fn remove_source(&self, ctx: &OpContext, source: &str) -> Result<()> {
        ctx.check()?;
        let _guard = self.guard();

        let mut sources = self.store.load_sources()?;
        let before = sources.len();
        let canonical = canonical_source(source)?;
        sources.retain(|s| s != source && *s != canonical);

        if sources.len() == before {
            tracing::debug!("Source {} is not registered", source);
            return Ok(());
        }

        self.store.save_sources(&sources)?;
        tracing::info!("Removed tarball source {}", source);
        Ok(())
    }

    fn is_compatible(
        self: Arc<Self>,
        ctx: &OpContext,
        source: &str,
    ) -> Result<Arc<dyn PackageManager>> {
        ctx.check()?;

        let Some(path) = source_path(source) else {
            bail!("{} is not a local source", source);
        };
        if !(path.is_dir() || (path.is_file() && is_archive(&path))) {
            bail!("{} is neither a directory nor a tarball", source);
        }

        let manager: Arc<dyn PackageManager> = self;
        Ok(manager)
    }

    fn format(&self) -> &str {
        TARBALL_FORMAT
    }
}

/// Where packed archives go.
struct Output {
    dir: PathBuf,
    overwrite: bool,
}

impl Output {
    fn prepare(opts: &PackOptions) -> Result<Self> {
        let dir = opts.output_dir();
        ensure_dir(dir)?;
        Ok(Output {
            dir: normalize_path(dir),
            overwrite: opts.overwrite,
        })
    }

    /// Archives already sitting in the output directory are never packed.
    fn skips(&self, path: &Path) -> bool {
        (path.parent() == Some(self.dir.as_path()) && is_archive(path))
            || path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(archive::TEMP_PREFIX))
    }

    fn write(
        &self,
        name: &str,
        version: Option<&str>,
        fill: impl FnOnce(&mut ArchiveWriter) -> Result<()>,
    ) -> Result<TarballPackage> {
        let dest = self.dir.join(archive_file_name(name, version)?);
        if dest.exists() && !self.overwrite {
            bail!(
                "archive {} already exists (use --overwrite to replace it)",
                dest.display()
            );
        }

        let mut writer = ArchiveWriter::create(&self.dir)?;
        fill(&mut writer)?;
        let entries = writer.entries();
        writer.finish(&dest, self.overwrite)?;

        let checksum = sha256_file(&dest)?;
        tracing::info!(
            "Packed {} ({} files, sha256 {})",
            dest.display(),
            entries,
            short_checksum(&checksum)
        );

        Ok(TarballPackage {
            name: name.to_string(),
            version: version.map(str::to_string),
            path: dest,
            checksum,
            source: self.dir.display().to_string(),
        })
    }
}

fn canonical_root(component: &dyn Component, path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("cannot pack {}: {} is not accessible", component.name(), path.display()))
}

/// Plain paths are stored absolute; URLs are stored as given.
fn canonical_source(source: &str) -> Result<String> {
    match source_path(source) {
        Some(path) if path.as_os_str() == source => {
            let absolute = std::path::absolute(&path)
                .with_context(|| format!("failed to resolve source {}", source))?;
            Ok(absolute.display().to_string())
        }
        _ => Ok(source.to_string()),
    }
}

/// Package name for `component`, unique within one pack call.
///
/// Falls back to the component's file name, then to a numbered name.
fn unique_name(component: &dyn Component, used: &mut HashSet<String>) -> Result<String> {
    let base = component.name();
    if base.is_empty() {
        bail!("cannot pack a component without a name");
    }
    if used.insert(base.to_string()) {
        return Ok(base.to_string());
    }

    if let Some(file_name) = component
        .path()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
    {
        if used.insert(file_name.to_string()) {
            return Ok(file_name.to_string());
        }
    }

    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if used.insert(candidate.clone()) {
            return Ok(candidate);
        }
        n += 1;
    }
}

fn collect_descendants<'a>(component: &'a dyn Component, out: &mut Vec<&'a dyn Component>) {
    for child in component.children() {
        out.push(child);
        collect_descendants(child, out);
    }
}

/// Archives in `path`: the file itself, or archives directly inside the
/// directory.
fn scan_source(ctx: &OpContext, source: &str, path: &Path) -> Result<Vec<TarballPackage>> {
    let files: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect()
    } else {
        vec![path.to_path_buf()]
    };

    let mut packages = Vec::new();
    for file in files {
        ctx.check()?;
        let Some((name, version)) = file
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|_| is_archive(&file))
            .and_then(parse_archive_name)
        else {
            continue;
        };

        packages.push(TarballPackage {
            name,
            version,
            checksum: sha256_file(&file)?,
            path: file,
            source: source.to_string(),
        });
    }

    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Architecture, Platform, Project, Target};
    use crate::packmanager::PackManagerError;
    use crate::test_support::{write_file, MockPackage, ProjectFixture};
    use tempfile::TempDir;

    struct Env {
        tmp: TempDir,
        manager: Arc<TarballManager>,
    }

    impl Env {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let manager = Arc::new(TarballManager::new(tmp.path().join("home/tarball")));
            Env { tmp, manager }
        }

        fn path(&self, relative: &str) -> PathBuf {
            self.tmp.path().join(relative)
        }

        /// Pack a single directory component into `repo/`.
        fn publish(&self, name: &str, version: &str) -> TarballPackage {
            let dir = self.path(&format!("build-{name}-{version}"));
            write_file(&dir, "README", name);
            let component = ComponentConfig::new(name).with_version(version).with_path(&dir);
            let opts = PackOptions::new().with_output_dir(self.path("repo"));
            let packages = self
                .manager
                .pack(&OpContext::new(), &component, &opts)
                .unwrap();
            TarballPackage {
                name: packages[0].name().to_string(),
                version: packages[0].version().map(str::to_string),
                path: packages[0].path().unwrap().to_path_buf(),
                checksum: packages[0].checksum().unwrap().to_string(),
                source: String::new(),
            }
        }
    }

    fn names(packages: &[Box<dyn Package>]) -> Vec<String> {
        packages.iter().map(|p| p.name().to_string()).collect()
    }

    #[test]
    fn test_format() {
        let env = Env::new();
        assert_eq!(env.manager.format(), TARBALL_FORMAT);
    }

    #[test]
    fn test_from_is_unsupported() {
        let env = Env::new();
        let err = env.manager.from("tarball").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PackManagerError>(),
            Some(PackManagerError::Unsupported { operation: "from", .. })
        ));
    }

    #[test]
    fn test_pack_directory_component() {
        let env = Env::new();
        let src = env.path("app");
        write_file(&src, "bin/app", "binary");
        write_file(&src, "etc/app.conf", "conf");

        let component = ComponentConfig::new("app").with_version("1.2.0").with_path(&src);
        let opts = PackOptions::new().with_output_dir(env.path("out"));
        let packages = env.manager.pack(&OpContext::new(), &component, &opts).unwrap();

        assert_eq!(names(&packages), ["app"]);
        let archive = packages[0].path().unwrap();
        assert!(archive.ends_with("app-1.2.0.tar.gz"));
        assert_eq!(packages[0].format(), TARBALL_FORMAT);
        assert_eq!(packages[0].checksum().unwrap(), sha256_file(archive).unwrap());
    }

    #[test]
    fn test_pack_refuses_existing_archive() {
        let env = Env::new();
        let src = env.path("app");
        write_file(&src, "file", "x");
        let component = ComponentConfig::new("app").with_version("1.0.0").with_path(&src);
        let ctx = OpContext::new();

        let opts = PackOptions::new().with_output_dir(env.path("out"));
        env.manager.pack(&ctx, &component, &opts).unwrap();

        let err = env.manager.pack(&ctx, &component, &opts).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let opts = opts.with_overwrite(true);
        assert_eq!(env.manager.pack(&ctx, &component, &opts).unwrap().len(), 1);
    }

    #[test]
    fn test_pack_requires_path() {
        let env = Env::new();
        let err = env
            .manager
            .pack(&OpContext::new(), &ComponentConfig::new("ghost"), &PackOptions::new())
            .unwrap_err();
        assert!(err.to_string().contains("no path"));
    }

    #[test]
    fn test_pack_project_yields_one_package_per_target() {
        let env = Env::new();
        let root = env.path("hello");
        ProjectFixture::new("hello")
            .with_version("0.1.0")
            .with_target("x86_64", "qemu")
            .write_to(&root)
            .unwrap();

        let mut project = Project::load(&root).unwrap();
        project.normalize().unwrap();

        let out = env.path("dist");
        let opts = PackOptions::new().with_output_dir(&out);
        let packages = env.manager.pack(&OpContext::new(), &project, &opts).unwrap();

        // The target shares the project name; its kernel file names it.
        assert_eq!(names(&packages), ["hello", "hello_qemu-x86_64"]);
        assert!(out.join("hello-0.1.0.tar.gz").is_file());
        assert!(out.join("hello_qemu-x86_64-0.1.0.tar.gz").is_file());

        // The kernel lives in the target's package, not the project's.
        let unpack = env.path("check");
        extract_archive(&OpContext::new(), &out.join("hello-0.1.0.tar.gz"), &unpack, false).unwrap();
        assert!(unpack.join("packmux.toml").is_file());
        assert!(!unpack.join("build/hello_qemu-x86_64").exists());
    }

    #[test]
    fn test_pack_flatten_includes_outside_children() {
        let env = Env::new();
        let root = env.path("app");
        write_file(&root, "main.c", "int main;");
        let kernel = write_file(&env.path("elsewhere"), "kernel.img", "kernel");

        let component = ComponentConfig::new("app")
            .with_version("2.0.0")
            .with_path(&root)
            .with_child(ComponentConfig::new("kernel").with_path(&kernel));

        let out = env.path("out");
        let opts = PackOptions::new().with_output_dir(&out).with_flatten(true);
        let packages = env.manager.pack(&OpContext::new(), &component, &opts).unwrap();
        assert_eq!(names(&packages), ["app"]);

        let unpack = env.path("check");
        extract_archive(&OpContext::new(), &out.join("app-2.0.0.tar.gz"), &unpack, false).unwrap();
        assert!(unpack.join("main.c").is_file());
        assert_eq!(
            std::fs::read_to_string(unpack.join("kernel/kernel.img")).unwrap(),
            "kernel"
        );
    }

    #[test]
    fn test_pack_skips_archives_in_output_dir() {
        let env = Env::new();
        let root = env.path("app");
        write_file(&root, "main.c", "int main;");
        write_file(&root, "old-0.9.0.tar.gz", "stale");

        let component = ComponentConfig::new("app").with_version("1.0.0").with_path(&root);
        let opts = PackOptions::new().with_output_dir(&root);
        env.manager.pack(&OpContext::new(), &component, &opts).unwrap();

        let unpack = env.path("check");
        let entries =
            extract_archive(&OpContext::new(), &root.join("app-1.0.0.tar.gz"), &unpack, false).unwrap();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_pack_target_without_kernel_is_skipped() {
        let env = Env::new();
        let root = env.path("app");
        write_file(&root, "main.c", "int main;");

        let project = Project::new(&root)
            .with_name("app")
            .with_target(Target::new("app", Architecture::new("arm64"), Platform::new("fc")));
        let opts = PackOptions::new().with_output_dir(env.path("out"));
        let packages = env.manager.pack(&OpContext::new(), &project, &opts).unwrap();

        assert_eq!(names(&packages), ["app"]);
        assert!(env.path("out/app.tar.gz").is_file());
    }

    #[test]
    fn test_sources_are_deduplicated_and_persisted() {
        let env = Env::new();
        let ctx = OpContext::new();
        let repo = env.path("repo");
        let repo = repo.to_str().unwrap();

        env.manager.add_source(&ctx, repo).unwrap();
        env.manager.add_source(&ctx, repo).unwrap();
        assert_eq!(env.manager.sources().unwrap(), vec![repo.to_string()]);

        let reopened = TarballManager::new(env.path("home/tarball"));
        assert_eq!(reopened.sources().unwrap(), vec![repo.to_string()]);

        env.manager.remove_source(&ctx, repo).unwrap();
        assert!(env.manager.sources().unwrap().is_empty());

        // Removing an unknown source is not an error.
        env.manager.remove_source(&ctx, "/nowhere").unwrap();
    }

    #[test]
    fn test_update_and_catalog() {
        let env = Env::new();
        let ctx = OpContext::new();
        env.publish("nginx", "1.0.0");
        env.publish("nginx", "1.2.0");
        env.publish("redis", "7.0.0");
        write_file(&env.path("repo"), "notes.txt", "not a package");

        env.manager.add_source(&ctx, env.path("repo").to_str().unwrap()).unwrap();
        env.manager.add_source(&ctx, env.path("missing").to_str().unwrap()).unwrap();
        env.manager.update(&ctx).unwrap();

        let all = env.manager.catalog(&ctx, &CatalogQuery::new()).unwrap();
        assert_eq!(names(&all), ["nginx", "nginx", "redis"]);

        let query = CatalogQuery::new().with_name("nginx").with_version(">=1.1");
        let found = env.manager.catalog(&ctx, &query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].version(), Some("1.2.0"));

        let query = CatalogQuery::new().with_name("re*");
        assert_eq!(names(&env.manager.catalog(&ctx, &query).unwrap()), ["redis"]);
    }

    #[test]
    fn test_catalog_source_filter_accepts_any_spelling() {
        let env = Env::new();
        let ctx = OpContext::new();
        env.publish("nginx", "1.0.0");
        let repo = env.path("repo");
        env.manager.add_source(&ctx, repo.to_str().unwrap()).unwrap();
        env.manager.update(&ctx).unwrap();

        let dotted = format!("{}/./repo", env.tmp.path().display());
        for spelling in [repo.to_str().unwrap(), dotted.as_str()] {
            let query = CatalogQuery::new().with_source(spelling);
            assert_eq!(names(&env.manager.catalog(&ctx, &query).unwrap()), ["nginx"]);
        }

        let query = CatalogQuery::new().with_source(env.path("other").to_str().unwrap());
        assert!(env.manager.catalog(&ctx, &query).unwrap().is_empty());
    }

    #[test]
    fn test_catalog_uses_cache_unless_no_cache() {
        let env = Env::new();
        let ctx = OpContext::new();
        env.publish("nginx", "1.0.0");
        env.manager.add_source(&ctx, env.path("repo").to_str().unwrap()).unwrap();
        env.manager.update(&ctx).unwrap();

        env.publish("redis", "7.0.0");

        let cached = env.manager.catalog(&ctx, &CatalogQuery::new()).unwrap();
        assert_eq!(names(&cached), ["nginx"]);

        let fresh = env
            .manager
            .catalog(&ctx, &CatalogQuery::new().with_no_cache(true))
            .unwrap();
        assert_eq!(names(&fresh), ["nginx", "redis"]);
    }

    #[test]
    fn test_catalog_without_index_scans() {
        let env = Env::new();
        let ctx = OpContext::new();
        env.publish("nginx", "1.0.0");
        env.manager.add_source(&ctx, env.path("repo").to_str().unwrap()).unwrap();

        let found = env.manager.catalog(&ctx, &CatalogQuery::new()).unwrap();
        assert_eq!(names(&found), ["nginx"]);
    }

    #[test]
    fn test_single_file_source() {
        let env = Env::new();
        let ctx = OpContext::new();
        let package = env.publish("nginx", "1.0.0");
        let url = format!("file://{}", package.path.display());

        env.manager.add_source(&ctx, &url).unwrap();
        assert_eq!(env.manager.sources().unwrap(), vec![url.clone()]);
        env.manager.update(&ctx).unwrap();

        let found = env.manager.catalog(&ctx, &CatalogQuery::new().with_source(&url)).unwrap();
        assert_eq!(names(&found), ["nginx"]);
    }

    #[test]
    fn test_update_honours_cancellation() {
        let env = Env::new();
        let ctx = OpContext::new();
        env.manager.add_source(&ctx, env.path("repo").to_str().unwrap()).unwrap();

        ctx.cancel();
        let err = env.manager.update(&ctx).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PackManagerError>(),
            Some(PackManagerError::Cancelled)
        ));
    }

    #[test]
    fn test_unpack_roundtrip() {
        let env = Env::new();
        let package = env.publish("nginx", "1.0.0");

        let opts = UnpackOptions::new().with_workdir(env.path("work"));
        let components = env.manager.unpack(&OpContext::new(), &package, &opts).unwrap();

        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name(), "nginx");
        assert_eq!(components[0].version(), Some("1.0.0"));
        assert_eq!(components[0].path(), Some(env.path("work/nginx").as_path()));
        assert_eq!(
            std::fs::read_to_string(env.path("work/nginx/README")).unwrap(),
            "nginx"
        );
    }

    #[test]
    fn test_unpack_refuses_non_empty_destination() {
        let env = Env::new();
        let package = env.publish("nginx", "1.0.0");
        write_file(&env.path("work/nginx"), "existing", "data");
        let ctx = OpContext::new();

        let opts = UnpackOptions::new().with_workdir(env.path("work"));
        let err = env.manager.unpack(&ctx, &package, &opts).unwrap_err();
        assert!(err.to_string().contains("not empty"));

        let opts = opts.with_overwrite(true);
        assert_eq!(env.manager.unpack(&ctx, &package, &opts).unwrap().len(), 1);
        assert!(env.path("work/nginx/README").is_file());
        assert!(!env.path("work/nginx/existing").exists());
    }

    #[test]
    fn test_unpack_detects_checksum_mismatch() {
        let env = Env::new();
        let mut package = env.publish("nginx", "1.0.0");
        package.checksum = "0".repeat(64);

        let opts = UnpackOptions::new().with_workdir(env.path("work"));
        let err = env
            .manager
            .unpack(&OpContext::new(), &package, &opts)
            .unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn test_unpack_ignores_foreign_packages() {
        let env = Env::new();
        let package = MockPackage::new("nginx", "oci");

        let opts = UnpackOptions::new().with_workdir(env.path("work"));
        let components = env.manager.unpack(&OpContext::new(), &package, &opts).unwrap();
        assert!(components.is_empty());
        assert!(!env.path("work").exists());
    }

    #[test]
    fn test_unpack_finds_archive_in_index() {
        let env = Env::new();
        let ctx = OpContext::new();
        env.publish("nginx", "1.0.0");
        env.manager.add_source(&ctx, env.path("repo").to_str().unwrap()).unwrap();
        env.manager.update(&ctx).unwrap();

        let package = MockPackage::new("nginx", TARBALL_FORMAT).with_version("1.0.0");
        let opts = UnpackOptions::new().with_workdir(env.path("work"));
        let components = env.manager.unpack(&ctx, &package, &opts).unwrap();
        assert_eq!(components.len(), 1);
    }

    #[test]
    fn test_is_compatible() {
        let env = Env::new();
        let ctx = OpContext::new();
        let package = env.publish("nginx", "1.0.0");
        let notes = write_file(env.tmp.path(), "notes.txt", "text");

        let dir = env.path("repo");
        let chosen = Arc::clone(&env.manager)
            .is_compatible(&ctx, dir.to_str().unwrap())
            .unwrap();
        assert_eq!(chosen.format(), TARBALL_FORMAT);

        let archive = package.path.to_str().unwrap();
        assert!(Arc::clone(&env.manager).is_compatible(&ctx, archive).is_ok());

        let url = format!("file://{}", dir.display());
        assert!(Arc::clone(&env.manager).is_compatible(&ctx, &url).is_ok());

        assert!(Arc::clone(&env.manager)
            .is_compatible(&ctx, notes.to_str().unwrap())
            .is_err());
        assert!(Arc::clone(&env.manager)
            .is_compatible(&ctx, "https://example.com/repo")
            .is_err());
        assert!(Arc::clone(&env.manager)
            .is_compatible(&ctx, env.path("missing").to_str().unwrap())
            .is_err());
    }
}
