//! Components - the buildable units consumed by `pack` and produced by `unpack`.

use std::fmt;
use std::path::{Path, PathBuf};

/// The kind of buildable unit a component represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComponentType {
    /// The core of the toolchain itself
    Core,
    /// An architecture definition
    Arch,
    /// A platform definition
    Plat,
    /// A library
    Lib,
    /// An application
    App,
    /// Anything else
    #[default]
    Unknown,
}

impl ComponentType {
    /// Get the component type as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Core => "core",
            ComponentType::Arch => "arch",
            ComponentType::Plat => "plat",
            ComponentType::Lib => "lib",
            ComponentType::App => "app",
            ComponentType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ComponentType {
    type Err = ComponentTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "core" => Ok(ComponentType::Core),
            "arch" => Ok(ComponentType::Arch),
            "plat" => Ok(ComponentType::Plat),
            "lib" => Ok(ComponentType::Lib),
            "app" => Ok(ComponentType::App),
            "unknown" => Ok(ComponentType::Unknown),
            _ => Err(ComponentTypeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid component type.
#[derive(Debug, Clone)]
pub struct ComponentTypeParseError(pub String);

impl fmt::Display for ComponentTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid component type '{}', valid values: core, arch, plat, lib, app, unknown",
            self.0
        )
    }
}

impl std::error::Error for ComponentTypeParseError {}

/// A buildable unit.
///
/// Package managers only rely on `name()`; everything else is optional
/// metadata a particular backend may use.
pub trait Component: fmt::Debug + Send + Sync {
    /// Name of the component.
    fn name(&self) -> &str;

    /// Version of the component, if known.
    fn version(&self) -> Option<&str> {
        None
    }

    /// Where the component originally came from (URL, archive, directory).
    fn source(&self) -> Option<&str> {
        None
    }

    /// Local path holding the component's files.
    fn path(&self) -> Option<&Path> {
        None
    }

    /// What kind of unit this is.
    fn component_type(&self) -> ComponentType {
        ComponentType::Unknown
    }

    /// Sub-components this component is made of.
    fn children(&self) -> Vec<&dyn Component> {
        Vec::new()
    }
}

/// A plain component description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentConfig {
    name: String,
    version: Option<String>,
    source: Option<String>,
    path: Option<PathBuf>,
    kind: ComponentType,
    children: Vec<ComponentConfig>,
}

impl ComponentConfig {
    /// Create a new component with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        ComponentConfig {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the local path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the component type.
    pub fn with_type(mut self, kind: ComponentType) -> Self {
        self.kind = kind;
        self
    }

    /// Add a sub-component.
    pub fn with_child(mut self, child: ComponentConfig) -> Self {
        self.children.push(child);
        self
    }
}

impl Component for ComponentConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn component_type(&self) -> ComponentType {
        self.kind
    }

    fn children(&self) -> Vec<&dyn Component> {
        self.children.iter().map(|c| c as &dyn Component).collect()
    }
}
