//! Build targets - a platform/architecture pair a project is built for.
//!
//! A target's kernel image follows the `<name>_<plat>-<arch>` naming
//! pattern used by the build system, with a `.dbg` suffix for the
//! unstripped image.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::component::{Component, ComponentType};

/// Key/value build configuration (`CONFIG_*` options).
pub type KConfig = BTreeMap<String, String>;

/// Error produced while deriving target names.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("target name not set, cannot determine binary name")]
    MissingName,
}

/// A CPU architecture (e.g. `x86_64`, `arm64`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Architecture {
    name: String,
    kconfig: KConfig,
}

impl Architecture {
    /// Create an architecture by name.
    pub fn new(name: impl Into<String>) -> Self {
        Architecture {
            name: name.into(),
            kconfig: KConfig::new(),
        }
    }

    /// Add a configuration option.
    pub fn with_kconfig(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kconfig.insert(key.into(), value.into());
        self
    }

    /// Architecture name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration options set by this architecture.
    pub fn kconfig(&self) -> &KConfig {
        &self.kconfig
    }
}

/// A platform (hypervisor or machine, e.g. `qemu`, `fc`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Platform {
    name: String,
    kconfig: KConfig,
}

impl Platform {
    /// Create a platform by name.
    pub fn new(name: impl Into<String>) -> Self {
        Platform {
            name: name.into(),
            kconfig: KConfig::new(),
        }
    }

    /// Add a configuration option.
    pub fn with_kconfig(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kconfig.insert(key.into(), value.into());
        self
    }

    /// Platform name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration options set by this platform.
    pub fn kconfig(&self) -> &KConfig {
        &self.kconfig
    }
}

/// A build target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    name: String,
    architecture: Architecture,
    platform: Platform,
    kconfig: KConfig,
    format: Option<String>,
    kernel: Option<PathBuf>,
    kernel_dbg: Option<PathBuf>,
    command: Vec<String>,
}

impl Target {
    /// Create a new target.
    pub fn new(name: impl Into<String>, architecture: Architecture, platform: Platform) -> Self {
        Target {
            name: name.into(),
            architecture,
            platform,
            ..Default::default()
        }
    }

    /// Set the desired package format.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the kernel image path.
    pub fn with_kernel(mut self, kernel: impl Into<PathBuf>) -> Self {
        self.kernel = Some(kernel.into());
        self
    }

    /// Set the unstripped kernel image path.
    pub fn with_kernel_dbg(mut self, kernel_dbg: impl Into<PathBuf>) -> Self {
        self.kernel_dbg = Some(kernel_dbg.into());
        self
    }

    /// Set the command-line arguments.
    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    /// Add a target-specific configuration option.
    pub fn with_kconfig(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kconfig.insert(key.into(), value.into());
        self
    }

    /// Target architecture.
    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    /// Target platform.
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Desired package format, if any.
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Path to the kernel image.
    pub fn kernel(&self) -> Option<&Path> {
        self.kernel.as_deref()
    }

    /// Path to the unstripped kernel image.
    pub fn kernel_dbg(&self) -> Option<&Path> {
        self.kernel_dbg.as_deref()
    }

    /// Command-line arguments.
    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn set_format(&mut self, format: impl Into<String>) {
        self.format = Some(format.into());
    }

    pub(crate) fn map_paths(&mut self, f: impl Fn(&Path) -> PathBuf) {
        self.kernel = self.kernel.as_deref().map(&f);
        self.kernel_dbg = self.kernel_dbg.as_deref().map(&f);
    }

    /// Canonical `<plat>-<arch>` string.
    pub fn arch_plat_string(&self) -> String {
        format!("{}-{}", self.platform.name(), self.architecture.name())
    }

    /// Effective configuration: target options overridden by the
    /// architecture's, then by the platform's.
    pub fn kconfig(&self) -> KConfig {
        let mut values = KConfig::new();
        values.extend(self.kconfig.clone());
        values.extend(self.architecture.kconfig().clone());
        values.extend(self.platform.kconfig().clone());
        values
    }

    /// Kernel image file name, `<name>_<plat>-<arch>`.
    pub fn kernel_name(&self) -> Result<String, TargetError> {
        if self.name.is_empty() {
            return Err(TargetError::MissingName);
        }

        Ok(format!(
            "{}_{}-{}",
            self.name,
            self.platform.name(),
            self.architecture.name()
        ))
    }

    /// Unstripped kernel image file name, `<name>_<plat>-<arch>.dbg`.
    pub fn kernel_dbg_name(&self) -> Result<String, TargetError> {
        Ok(format!("{}.dbg", self.kernel_name()?))
    }
}

impl Component for Target {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> Option<&Path> {
        self.kernel()
    }

    fn component_type(&self) -> ComponentType {
        ComponentType::Unknown
    }
}
