//! Persistent state of the tarball package manager.
//!
//! ```text
//! <state dir>/
//!   sources.json   registered sources, in insertion order
//!   index.json     catalog built by the last update
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::Package;
use crate::util::fs::{read_to_string, write_atomic};

/// Format served by the tarball package manager.
pub const TARBALL_FORMAT: &str = "tarball";

/// A tarball known to the package manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarballPackage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub path: PathBuf,
    pub checksum: String,
    /// Source the archive was found in, or the output directory it was
    /// packed into.
    pub source: String,
}

impl Package for TarballPackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn format(&self) -> &str {
        TARBALL_FORMAT
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn checksum(&self) -> Option<&str> {
        Some(&self.checksum)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SourcesFile {
    sources: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    packages: Vec<TarballPackage>,
}

/// On-disk state: registered sources and the cached catalog.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Store { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn sources_path(&self) -> PathBuf {
        self.dir.join("sources.json")
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join("index.json")
    }

    /// Registered sources. Empty when nothing was ever registered.
    pub fn load_sources(&self) -> Result<Vec<String>> {
        let path = self.sources_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let contents = read_to_string(&path)?;
        let file: SourcesFile = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(file.sources)
    }

    pub fn save_sources(&self, sources: &[String]) -> Result<()> {
        let file = SourcesFile {
            sources: sources.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&file).context("failed to serialize sources")?;
        write_atomic(&self.sources_path(), &json)
    }

    /// Cached catalog, or `None` if no update ever ran.
    pub fn load_index(&self) -> Result<Option<Vec<TarballPackage>>> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents = read_to_string(&path)?;
        let file: IndexFile = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(file.packages))
    }

    pub fn save_index(&self, packages: &[TarballPackage]) -> Result<()> {
        let file = IndexFile {
            packages: packages.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&file).context("failed to serialize index")?;
        write_atomic(&self.index_path(), &json)
    }
}

/// Filesystem path behind a source: a plain path or a `file://` URL.
///
/// Returns `None` for URLs with any other scheme.
pub fn source_path(source: &str) -> Option<PathBuf> {
    match Url::parse(source) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().ok(),
        // Single-letter schemes are Windows drive letters.
        Ok(url) if url.scheme().len() > 1 => None,
        _ => Some(PathBuf::from(source)),
    }
}
