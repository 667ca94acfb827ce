//! Test utilities and mocks for packmux unit tests.
//!
//! `MockManager` is a scriptable `PackageManager`: it records every call in a
//! call log that several mocks can share, returns canned packages and
//! components, and fails on demand.
//!
//! # Example
//!
//! ```rust,ignore
//! use packmux::test_support::{new_call_log, call_count, MockManager};
//!
//! let log = new_call_log();
//! let oci = MockManager::new("oci").with_log(&log).failing("update");
//! // register, fan out, then inspect the log...
//! assert_eq!(call_count(&log, "oci:update"), 1);
//! ```

pub mod fixtures;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use thiserror::Error;

use crate::core::{CatalogQuery, Component, ComponentConfig, PackOptions, Package, UnpackOptions};
use crate::packmanager::{OpContext, PackManagerError, PackageManager};

pub use fixtures::*;

/// In-memory sink for formatted log lines.
#[derive(Debug, Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with every `tracing` event on this thread, down to `TRACE`,
/// captured. Returns the result of `f` and the formatted events.
pub fn capture_traces<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let output = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, output)
}

/// Call log shared between mocks. Entries look like `"<format>:<operation>"`.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Create an empty call log.
pub fn new_call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Number of times `entry` appears in the log.
pub fn call_count(log: &CallLog, entry: &str) -> usize {
    log.lock().unwrap().iter().filter(|e| *e == entry).count()
}

/// Error returned by a `MockManager` operation set up to fail.
#[derive(Debug, Error)]
#[error("{format} failed during {operation}")]
pub struct MockError {
    pub format: String,
    pub operation: String,
}

/// Package returned by `MockManager`.
#[derive(Debug, Clone)]
pub struct MockPackage {
    name: String,
    format: String,
    version: Option<String>,
}

impl MockPackage {
    pub fn new(name: impl Into<String>, format: impl Into<String>) -> Self {
        MockPackage {
            name: name.into(),
            format: format.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

impl Package for MockPackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn format(&self) -> &str {
        &self.format
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// Scriptable package manager.
#[derive(Debug)]
pub struct MockManager {
    format: String,
    log: CallLog,
    packages: Vec<String>,
    components: Vec<String>,
    failing: HashSet<&'static str>,
    accepts: Vec<String>,
    respects_cancellation: bool,
}

impl MockManager {
    /// A manager that succeeds at everything and returns nothing.
    pub fn new(format: impl Into<String>) -> Self {
        MockManager {
            format: format.into(),
            log: new_call_log(),
            packages: Vec::new(),
            components: Vec::new(),
            failing: HashSet::new(),
            accepts: Vec::new(),
            respects_cancellation: false,
        }
    }

    /// Record calls into `log` instead of a private one.
    pub fn with_log(mut self, log: &CallLog) -> Self {
        self.log = Arc::clone(log);
        self
    }

    /// Names of the packages returned by `pack` and `catalog`.
    pub fn with_packages(mut self, names: &[&str]) -> Self {
        self.packages = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Names of the components returned by `unpack`.
    pub fn with_components(mut self, names: &[&str]) -> Self {
        self.components = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Fail `operation` with a `MockError`.
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// Report `source` as compatible.
    pub fn accepting(mut self, source: impl Into<String>) -> Self {
        self.accepts.push(source.into());
        self
    }

    /// Check the context before doing anything.
    pub fn respecting_cancellation(mut self) -> Self {
        self.respects_cancellation = true;
        self
    }

    /// Calls recorded so far, across every mock sharing the log.
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn enter(&self, ctx: &OpContext, operation: &'static str) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.format, operation));

        if self.respects_cancellation {
            ctx.check()?;
        }

        if self.failing.contains(operation) {
            return Err(MockError {
                format: self.format.clone(),
                operation: operation.to_string(),
            }
            .into());
        }

        Ok(())
    }

    fn canned_packages(&self) -> Vec<Box<dyn Package>> {
        self.packages
            .iter()
            .map(|name| Box::new(MockPackage::new(name.as_str(), self.format.as_str())) as Box<dyn Package>)
            .collect()
    }
}

impl PackageManager for MockManager {
    fn update(&self, ctx: &OpContext) -> Result<()> {
        self.enter(ctx, "update")
    }

    fn pack(
        &self,
        ctx: &OpContext,
        _component: &dyn Component,
        _opts: &PackOptions,
    ) -> Result<Vec<Box<dyn Package>>> {
        self.enter(ctx, "pack")?;
        Ok(self.canned_packages())
    }

    fn unpack(
        &self,
        ctx: &OpContext,
        _package: &dyn Package,
        _opts: &UnpackOptions,
    ) -> Result<Vec<Box<dyn Component>>> {
        self.enter(ctx, "unpack")?;
        Ok(self
            .components
            .iter()
            .map(|name| Box::new(ComponentConfig::new(name.as_str())) as Box<dyn Component>)
            .collect())
    }

    fn catalog(&self, ctx: &OpContext, _query: &CatalogQuery) -> Result<Vec<Box<dyn Package>>> {
        self.enter(ctx, "catalog")?;
        Ok(self.canned_packages())
    }

    fn add_source(&self, ctx: &OpContext, _source: &str) -> Result<()> {
        self.enter(ctx, "add_source")
    }

    fn remove_source(&self, ctx: &OpContext, _source: &str) -> Result<()> {
        self.enter(ctx, "remove_source")
    }

    fn is_compatible(
        self: Arc<Self>,
        ctx: &OpContext,
        source: &str,
    ) -> Result<Arc<dyn PackageManager>> {
        self.enter(ctx, "is_compatible")?;
        if self.accepts.iter().any(|s| s == source) {
            let manager: Arc<dyn PackageManager> = self;
            Ok(manager)
        } else {
            Err(PackManagerError::NoCompatibleManager(source.to_string()).into())
        }
    }

    fn format(&self) -> &str {
        &self.format
    }
}

/// Create a temporary directory laid out like a project.
pub fn create_test_project(name: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    ProjectFixture::new(name).write_to(dir.path()).unwrap();
    dir
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
