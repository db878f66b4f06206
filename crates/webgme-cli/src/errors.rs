//! Error types surfaced by component operations
//!
//! Every manager operation returns a [`ComponentError`]; the binary turns it
//! into a logged message and a non-zero exit status.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use webgme_config::LayoutError;
use webgme_manifest::{ComponentKind, ManifestError};

#[derive(Error, Debug)]
pub enum ComponentError {
    #[error("No webgme project found in {} or any parent directory", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("A webgme project already exists at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("Manifest not found: {}", .0.display())]
    ManifestMissing(PathBuf),

    #[error("Manifest {} is corrupt: {reason}", path.display())]
    ManifestCorrupt { path: PathBuf, reason: String },

    #[error("{kind} '{name}' not found")]
    ComponentNotFound { kind: ComponentKind, name: String },

    #[error("{kind} '{name}' already exists (use --force to overwrite)")]
    DuplicateComponent { kind: ComponentKind, name: String },

    #[error("Failed to install '{package}': {reason}")]
    DependencyInstallFailed { package: String, reason: String },

    #[error("Mount point '{mount}' is already used by router '{owner}'")]
    MountPointInUse { mount: String, owner: String },

    #[error("{0} components cannot be enabled or disabled")]
    NotEnableable(ComponentKind),

    #[error("{0} components have no mount point")]
    NotMountable(ComponentKind),

    #[error("Generator error: {0}")]
    Generator(String),

    #[error("Plugin runtime error: {0}")]
    Runtime(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Manifest error: {0}")]
    Manifest(ManifestError),
}

impl From<ManifestError> for ComponentError {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::Missing(path) => ComponentError::ManifestMissing(path),
            ManifestError::Corrupt { path, source } => ComponentError::ManifestCorrupt {
                path,
                reason: source.to_string(),
            },
            ManifestError::DuplicateComponent { kind, name } => {
                ComponentError::DuplicateComponent { kind, name }
            }
            ManifestError::ComponentNotFound { kind, name }
            | ManifestError::Unresolved { kind, name, .. } => {
                ComponentError::ComponentNotFound { kind, name }
            }
            ManifestError::Io(e) => ComponentError::Io(e),
            other => ComponentError::Manifest(other),
        }
    }
}

impl From<LayoutError> for ComponentError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::ProjectNotFound(path) => ComponentError::ProjectNotFound(path),
            LayoutError::PathResolution(msg) => {
                ComponentError::Io(io::Error::new(io::ErrorKind::Other, msg))
            }
        }
    }
}
