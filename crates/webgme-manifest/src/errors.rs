use crate::kinds::ComponentKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during manifest and runtime configuration operations
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Manifest not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to parse manifest {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{kind} '{name}' is already registered")]
    DuplicateComponent { kind: ComponentKind, name: String },

    #[error("{kind} '{name}' not found in components or dependencies")]
    ComponentNotFound { kind: ComponentKind, name: String },

    #[error("Could not find {kind} '{name}' in project {}", project.display())]
    Unresolved {
        kind: ComponentKind,
        name: String,
        project: PathBuf,
    },

    #[error("Failed to read runtime config {}: {reason}", path.display())]
    ConfigRead { path: PathBuf, reason: String },

    #[error("Invalid config pattern: {0}")]
    Pattern(#[from] regex::Error),
}
