//! Manifest data model
//!
//! The manifest has two mappings, `components` (generated in this project) and
//! `dependencies` (imported from elsewhere), each keyed by kind and then by
//! component name. Maps are ordered so serialization is stable and diffable.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// kind key -> component name -> record
pub type ComponentTable = BTreeMap<String, BTreeMap<String, Record>>;

/// Top-level structure of `webgme-setup.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub components: ComponentTable,
    #[serde(default)]
    pub dependencies: ComponentTable,

    /// Top-level keys this tool does not know about, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Attributes of one registered component
///
/// Local components carry `src` (older manifests use `srcPath`); dependencies
/// carry the `project` they were imported from and the `path` of the component
/// relative to this project's root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(rename = "srcPath", default, skip_serializing_if = "Option::is_none")]
    pub src_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Record {
    pub fn local(src: impl Into<String>) -> Self {
        Record {
            src: Some(src.into()),
            ..Default::default()
        }
    }

    pub fn dependency(project: impl Into<String>, path: impl Into<String>) -> Self {
        Record {
            project: Some(project.into()),
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_test(mut self, test: impl Into<String>) -> Self {
        self.test = Some(test.into());
        self
    }

    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = Some(mount.into());
        self
    }

    /// Source directory of a local component
    pub fn source_path(&self) -> Option<&str> {
        self.src
            .as_deref()
            .or(self.src_path.as_deref())
            .filter(|p| !p.trim().is_empty())
    }

    /// The path that goes into the runtime configuration
    pub fn registered_path(&self) -> Option<&str> {
        self.source_path()
            .or(self.path.as_deref())
            .filter(|p| !p.trim().is_empty())
    }

    /// Every on-disk path a local component owns
    pub fn local_paths(&self) -> Vec<&str> {
        [&self.src, &self.src_path, &self.test, &self.widget]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.trim().is_empty())
            .collect()
    }
}

/// Which manifest mapping a record lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Component,
    Dependency,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Component => f.write_str("components"),
            Origin::Dependency => f.write_str("dependencies"),
        }
    }
}

/// Result of removing a record from the manifest
#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
    pub record: Record,
    pub origin: Origin,
}

/// How `register` treats a name that is already taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterMode {
    /// Fail with `DuplicateComponent`
    #[default]
    Strict,
    /// Replace the existing record
    Overwrite,
}

/// Names registered for one kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub components: Vec<String>,
    pub dependencies: Vec<String>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.dependencies.is_empty()
    }
}
