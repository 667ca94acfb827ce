//! Reading and writing gzip-compressed tar archives.
//!
//! Archives are named `<name>-<version>.tar.gz`, or `<name>.tar.gz` when the
//! packed component has no version. `.tgz` is accepted when reading.

use std::fs::File;
use std::path::{Component as PathComponent, Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use semver::Version;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::packmanager::OpContext;
use crate::util::fs::{ensure_dir, is_empty_dir, remove_dir_all_if_exists};

/// Recognized archive extensions. The first one is used for new archives.
pub const ARCHIVE_EXTENSIONS: [&str; 2] = [".tar.gz", ".tgz"];

/// Prefix of in-progress archives.
pub const TEMP_PREFIX: &str = ".packmux-";

fn strip_extension(file_name: &str) -> Option<&str> {
    ARCHIVE_EXTENSIONS
        .iter()
        .find_map(|ext| file_name.strip_suffix(ext))
        .filter(|stem| !stem.is_empty())
}

/// Check whether `path` names a tarball.
pub fn is_archive(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| !n.starts_with(TEMP_PREFIX) && strip_extension(n).is_some())
}

/// File name of the archive for `name` at `version`.
pub fn archive_file_name(name: &str, version: Option<&str>) -> Result<String> {
    if name.is_empty() || name.contains(['/', '\\']) {
        bail!("invalid package name `{}`", name);
    }

    let file_name = match version {
        Some(version) => {
            Version::parse(version)
                .with_context(|| format!("invalid version `{}` for package {}", version, name))?;
            format!("{}-{}{}", name, version, ARCHIVE_EXTENSIONS[0])
        }
        None => format!("{}{}", name, ARCHIVE_EXTENSIONS[0]),
    };

    // A name such as `foo-1.0.0` would read back as package `foo`.
    if parse_archive_name(&file_name) != Some((name.to_string(), version.map(str::to_string))) {
        bail!(
            "package name `{}` contains a version and cannot be stored as {}",
            name,
            file_name
        );
    }
    Ok(file_name)
}

/// Split an archive file name into package name and version.
///
/// The version is the text after the first `-` that starts a valid semver
/// version, so names may contain dashes themselves.
pub fn parse_archive_name(file_name: &str) -> Option<(String, Option<String>)> {
    let stem = strip_extension(file_name)?;

    for (idx, _) in stem.match_indices('-') {
        let (name, version) = (&stem[..idx], &stem[idx + 1..]);
        if !name.is_empty() && Version::parse(version).is_ok() {
            return Some((name.to_string(), Some(version.to_string())));
        }
    }

    Some((stem.to_string(), None))
}

/// An archive being written to a temporary file next to its destination.
pub struct ArchiveWriter {
    tmp: NamedTempFile,
    builder: tar::Builder<GzEncoder<File>>,
    entries: usize,
}

impl ArchiveWriter {
    /// Start a new archive in `dir`.
    pub fn create(dir: &Path) -> Result<Self> {
        let tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dir)
            .with_context(|| format!("failed to create temporary archive in {}", dir.display()))?;
        let file = tmp
            .as_file()
            .try_clone()
            .context("failed to open temporary archive")?;

        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        builder.mode(tar::HeaderMode::Deterministic);

        Ok(ArchiveWriter {
            tmp,
            builder,
            entries: 0,
        })
    }

    /// Number of files appended so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Append a single file as `name`.
    pub fn append_file(&mut self, path: &Path, name: &Path) -> Result<()> {
        self.builder
            .append_path_with_name(path, name)
            .with_context(|| format!("failed to add {} to archive", path.display()))?;
        self.entries += 1;
        Ok(())
    }

    /// Append every regular file under `root` below `prefix`, skipping paths
    /// for which `skip` returns true (skipped directories are not entered).
    pub fn append_tree(
        &mut self,
        ctx: &OpContext,
        root: &Path,
        prefix: &Path,
        skip: &dyn Fn(&Path) -> bool,
    ) -> Result<()> {
        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !skip(e.path()));

        for entry in walker {
            ctx.check()?;
            let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(root)?;
            self.append_file(entry.path(), &prefix.join(relative))?;
        }

        Ok(())
    }

    /// Append `path` below `prefix`: the contents of a directory, or a file
    /// under its own name.
    pub fn append_path(
        &mut self,
        ctx: &OpContext,
        path: &Path,
        prefix: &Path,
        skip: &dyn Fn(&Path) -> bool,
    ) -> Result<()> {
        if path.is_dir() {
            self.append_tree(ctx, path, prefix, skip)
        } else if path.is_file() {
            let file_name = path
                .file_name()
                .with_context(|| format!("invalid file path {}", path.display()))?;
            self.append_file(path, &prefix.join(file_name))
        } else {
            bail!("cannot pack {}: no such file or directory", path.display())
        }
    }

    /// Finish the archive and move it to `dest`.
    ///
    /// Without `overwrite`, an existing `dest` is left untouched and the
    /// call fails.
    pub fn finish(self, dest: &Path, overwrite: bool) -> Result<()> {
        let encoder = self
            .builder
            .into_inner()
            .context("failed to finish archive")?;
        let file = encoder.finish().context("failed to compress archive")?;
        file.sync_all().context("failed to flush archive")?;

        let persisted = if overwrite {
            self.tmp.persist(dest)
        } else {
            self.tmp.persist_noclobber(dest)
        };
        persisted
            .map_err(|e| e.error)
            .with_context(|| format!("failed to write archive {}", dest.display()))?;

        Ok(())
    }
}

/// Extract `archive` into `dest`, returning the number of entries.
///
/// Entries land in a staging directory next to `dest` which replaces `dest`
/// only once every entry was extracted, so a failed extraction leaves `dest`
/// untouched. A non-empty `dest` is replaced only with `overwrite`. Fails on
/// any entry whose path would land outside `dest`.
pub fn extract_archive(
    ctx: &OpContext,
    archive: &Path,
    dest: &Path,
    overwrite: bool,
) -> Result<usize> {
    if !overwrite && !is_empty_dir(dest) {
        bail!("destination {} is not empty", dest.display());
    }

    let file = File::open(archive)
        .with_context(|| format!("failed to open archive {}", archive.display()))?;
    let mut tarball = tar::Archive::new(GzDecoder::new(file));

    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;
    let staging = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempdir_in(parent)
        .with_context(|| format!("failed to create staging directory in {}", parent.display()))?;

    let mut count = 0;
    for entry in tarball.entries().context("failed to read archive entries")? {
        ctx.check()?;
        let mut entry = entry.context("failed to read archive entry")?;
        let entry_path: PathBuf = entry
            .path()
            .context("failed to get entry path")?
            .into_owned();

        let escapes = entry_path
            .components()
            .any(|c| !matches!(c, PathComponent::Normal(_) | PathComponent::CurDir));
        if escapes {
            bail!(
                "archive entry escapes destination directory: {}",
                entry_path.display()
            );
        }

        let unpacked = entry
            .unpack_in(staging.path())
            .with_context(|| format!("failed to extract {}", entry_path.display()))?;
        if !unpacked {
            bail!(
                "archive entry escapes destination directory: {}",
                entry_path.display()
            );
        }
        count += 1;
    }

    remove_dir_all_if_exists(dest)?;
    std::fs::rename(staging.path(), dest)
        .with_context(|| format!("failed to move extracted files to {}", dest.display()))?;

    Ok(count)
}
