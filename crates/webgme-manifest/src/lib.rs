//! webgme component manifest management
//!
//! This crate owns the state a consuming project keeps about its components:
//! - `kinds`: the component kinds and the capability descriptor of each
//! - `manifest`: loading, normalizing, saving and mutating `webgme-setup.json`
//! - `runtime_config`: regenerating the framework configuration from a manifest
//! - `config_reader`: reading another project's configuration without running it
//! - `resolver`: locating a named component inside another project

pub mod config_reader;
pub mod errors;
pub mod kinds;
pub mod manifest;
pub mod resolver;
pub mod runtime_config;
pub mod types;

pub use errors::ManifestError;
pub use kinds::{ComponentKind, ConfigTarget, KindSpec};
pub use resolver::ComponentResolver;
pub use runtime_config::{regenerate, sync_runtime_config, ConfigDocument, RestComponent};
pub use types::{Listing, Manifest, Origin, Record, RegisterMode, Removed};
