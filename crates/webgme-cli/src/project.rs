//! Creating a new project

use crate::errors::ComponentError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use webgme_config::layout;
use webgme_manifest::{sync_runtime_config, Manifest};

/// Turn `dir` into a project: marker, empty manifest, generated config, `src/` and `test/`
///
/// Refuses to touch a directory that already holds a marker.
pub fn init_project(dir: &Path) -> Result<PathBuf, ComponentError> {
    let root = if dir.is_absolute() {
        layout::normalize_lexically(dir)
    } else {
        layout::normalize_lexically(&std::env::current_dir()?.join(dir))
    };

    let marker = layout::marker_path(&root);
    if marker.exists() {
        return Err(ComponentError::AlreadyInitialized(root));
    }

    fs::create_dir_all(&root)?;
    let marker_content = serde_json::json!({ "version": env!("CARGO_PKG_VERSION") });
    let marker_content = serde_json::to_string_pretty(&marker_content)
        .map_err(|e| ComponentError::Generator(e.to_string()))?;
    fs::write(&marker, marker_content + "\n")?;

    let manifest = Manifest::empty();
    manifest.save(&root)?;
    sync_runtime_config(&root, &manifest)?;

    for dir in ["src", "test"] {
        fs::create_dir_all(root.join(dir))?;
    }

    info!("Initialized project at {}", root.display());
    Ok(root)
}
