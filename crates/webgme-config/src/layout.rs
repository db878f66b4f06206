//! Project layout and path resolution for webgme projects
//!
//! This module provides:
//! - the file names that make up a consuming project (marker, manifest, generated config)
//! - the project locator, which walks ancestors looking for the marker file
//! - lexical path helpers shared by the manifest and CLI crates
//!
//! All helpers are purely lexical: nothing here canonicalizes, so symlinked
//! `node_modules` entries keep pointing inside the consuming project.

use std::path::{Component, Path, PathBuf};

/// Sentinel file written by `init`; its presence marks a project root
pub const MARKER_FILE: &str = ".webgme";

/// Component manifest at the project root
pub const MANIFEST_FILE: &str = "webgme-setup.json";

/// Directory holding the framework configuration
pub const CONFIG_DIR: &str = "config";

/// Generated runtime configuration, inside [`CONFIG_DIR`]
pub const RUNTIME_CONFIG_FILE: &str = "config.webgme.js";

/// Where the package manager installs imported projects
pub const NODE_MODULES_DIR: &str = "node_modules";

/// Error type for project layout resolution
#[derive(Debug, Clone)]
pub enum LayoutError {
    /// No directory between the start and the filesystem root holds the marker
    ProjectNotFound(PathBuf),
    /// Failed to turn a path into something usable
    PathResolution(String),
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutError::ProjectNotFound(path) => write!(
                f,
                "No webgme project found in {} or any parent directory (missing {})",
                path.display(),
                MARKER_FILE
            ),
            LayoutError::PathResolution(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Find the project root for `start_dir`
///
/// Walks `start_dir` and its ancestors and returns the first directory that
/// contains [`MARKER_FILE`]. Relative inputs are anchored at the current
/// directory once, here, so callers can thread the absolute root through.
pub fn locate_root(start_dir: &Path) -> Result<PathBuf, LayoutError> {
    let start = if start_dir.is_absolute() {
        start_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| {
                LayoutError::PathResolution(format!("Failed to read current directory: {}", e))
            })?
            .join(start_dir)
    };
    let start = normalize_lexically(&start);

    start
        .ancestors()
        .find(|dir| dir.join(MARKER_FILE).is_file())
        .map(Path::to_path_buf)
        .ok_or(LayoutError::ProjectNotFound(start))
}

pub fn marker_path(root: &Path) -> PathBuf {
    root.join(MARKER_FILE)
}

pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

pub fn runtime_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(RUNTIME_CONFIG_FILE)
}

/// Directory an installed package lands in
pub fn installed_package_dir(root: &Path, package_name: &str) -> PathBuf {
    let mut dir = root.join(NODE_MODULES_DIR);
    // scoped names ("@org/pkg") nest one level deeper
    for part in package_name.split('/') {
        dir.push(part);
    }
    dir
}

/// Normalize a stored path string to forward slashes
///
/// Backslashes become `/`, repeated separators collapse, `.` segments and
/// trailing separators are dropped and `..` folds into the segment before it.
/// An absolute path keeps its leading `/`.
pub fn normalize_separators(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                // nothing above the root of an absolute path
                _ if absolute => {}
                _ => segments.push(segment),
            },
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Render a path with forward slashes regardless of host OS
pub fn to_slash_string(path: &Path) -> String {
    normalize_separators(&path.to_string_lossy())
}

/// Resolve `.` and `..` components without touching the filesystem
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Express `path` relative to `base`, both taken lexically
///
/// Returns `None` when the two paths do not share a root (e.g. different
/// drive prefixes on Windows, or one relative and one absolute).
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    let path = normalize_lexically(path);
    let base = normalize_lexically(base);
    if path.has_root() != base.has_root() {
        return None;
    }

    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();

    if let (Some(Component::Prefix(a)), Some(Component::Prefix(b))) =
        (path_parts.first(), base_parts.first())
    {
        if a != b {
            return None;
        }
    }

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part.as_os_str());
    }
    Some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project_with_marker() -> Option<TempDir> {
        let temp_dir = TempDir::new().ok()?;
        fs::write(temp_dir.path().join(MARKER_FILE), "{}").ok()?;
        fs::create_dir_all(temp_dir.path().join("src").join("plugins")).ok()?;
        Some(temp_dir)
    }

    #[test]
    fn test_locate_root_from_root() {
        let Some(project) = project_with_marker() else {
            return;
        };
        let found = locate_root(project.path());
        assert!(found.is_ok_and(|root| root == project.path()));
    }

    #[test]
    fn test_locate_root_from_nested_directory() {
        let Some(project) = project_with_marker() else {
            return;
        };
        let nested = project.path().join("src").join("plugins");
        let found = locate_root(&nested);
        assert!(found.is_ok_and(|root| root == project.path()));
    }

    #[test]
    fn test_locate_root_not_found() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let result = locate_root(temp_dir.path());
        assert!(matches!(result, Err(LayoutError::ProjectNotFound(_))));
    }

    #[test]
    fn test_marker_directory_is_not_a_marker() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        if fs::create_dir(temp_dir.path().join(MARKER_FILE)).is_err() {
            return;
        }
        assert!(locate_root(temp_dir.path()).is_err());
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize_separators("src\\plugins\\Foo"), "src/plugins/Foo");
        assert_eq!(normalize_separators("./src//plugins/Foo/"), "src/plugins/Foo");
        assert_eq!(normalize_separators("/abs/path"), "/abs/path");
        assert_eq!(normalize_separators("../widgets"), "../widgets");
        assert_eq!(normalize_separators("src/./plugins/Foo"), "src/plugins/Foo");
        assert_eq!(normalize_separators("src/routers/../plugins/Foo"), "src/plugins/Foo");
        assert_eq!(normalize_separators("../../a/../b"), "../../b");
        assert_eq!(normalize_separators("/../abs"), "/abs");
        assert_eq!(normalize_separators("  "), "");
    }

    #[test]
    fn test_normalize_lexically() {
        let path = Path::new("/project/config/../src/./plugins");
        assert_eq!(normalize_lexically(path), PathBuf::from("/project/src/plugins"));
        assert_eq!(
            normalize_lexically(Path::new("../a/../b")),
            PathBuf::from("../b")
        );
    }

    #[test]
    fn test_relative_to() {
        let rel = relative_to(
            Path::new("/project/node_modules/dep/src/plugins/Foo"),
            Path::new("/project"),
        );
        assert_eq!(rel, Some(PathBuf::from("node_modules/dep/src/plugins/Foo")));

        let up = relative_to(Path::new("/other/widgets"), Path::new("/project/app"));
        assert_eq!(up, Some(PathBuf::from("../../other/widgets")));

        assert_eq!(relative_to(Path::new("rel"), Path::new("/abs")), None);
    }

    #[test]
    fn test_installed_package_dir_scoped() {
        let dir = installed_package_dir(Path::new("/project"), "@org/widgets");
        assert!(dir.ends_with("node_modules/@org/widgets"));
    }
}
