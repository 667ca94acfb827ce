//! Core data structures for packmux.
//!
//! This module contains the value objects package managers exchange:
//! - Components (what gets packed) and packages (what gets produced)
//! - Catalog queries and pack/unpack options
//! - Build targets and projects

pub mod component;
pub mod options;
pub mod package;
pub mod project;
pub mod query;
pub mod target;

pub use component::{Component, ComponentConfig, ComponentType};
pub use options::{PackOptions, UnpackOptions};
pub use package::{package_id, Package};
pub use project::{normalize_project_name, Project, ProjectError};
pub use query::CatalogQuery;
pub use target::{Architecture, Platform, Target, TargetError};
