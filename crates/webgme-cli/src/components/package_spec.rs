use std::path::{Path, PathBuf};

/// Expand tilde (~) to the home directory
fn expand_tilde(path: &str) -> String {
    if !path.starts_with('~') {
        return path.to_string();
    }

    match dirs::home_dir() {
        Some(home) => {
            let home_str = home.to_string_lossy();
            if path == "~" {
                home_str.to_string()
            } else if let Some(rest) = path.strip_prefix("~/") {
                format!("{}/{}", home_str, rest)
            } else {
                // ~someuser paths are not supported
                path.to_string()
            }
        }
        None => path.to_string(),
    }
}

/// Whether the specifier names a directory on disk rather than a registry or git package
pub fn is_local_path(spec: &str) -> bool {
    spec.starts_with("./")
        || spec.starts_with("../")
        || spec.starts_with('/')
        || spec.starts_with('~')
        || spec.starts_with("file:")
        || spec.contains('\\')
        || spec == "."
        || spec == ".."
}

/// Directory a local specifier points at, anchored at the project root
pub fn local_package_dir(spec: &str, root: &Path) -> PathBuf {
    let spec = spec.strip_prefix("file:").unwrap_or(spec);
    let expanded = expand_tilde(spec);
    let path = Path::new(&expanded);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Read the `name` field of a directory's package.json
fn name_from_package_json(dir: &Path) -> Option<String> {
    let content = std::fs::read_to_string(dir.join("package.json")).ok()?;
    let value: serde_json::Value = serde_json::from_str(&content).ok()?;
    value
        .get("name")
        .and_then(|name| name.as_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Extract the installed package name from a package specifier
///
/// Handles registry names with an optional `@version`, scoped names,
/// git URLs (with `git+` prefix and `#ref` fragment), `org/repo` shorthands,
/// and local directories, whose name comes from their package.json.
pub fn extract_package_name(spec: &str, root: &Path) -> Result<String, String> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err("Empty package specifier".to_string());
    }

    if is_local_path(spec) {
        let dir = local_package_dir(spec, root);
        return name_from_package_json(&dir).ok_or_else(|| {
            format!(
                "Failed to extract package name from {}",
                dir.join("package.json").display()
            )
        });
    }

    // Remove git+ prefix and #ref fragment if present
    let pkg = spec.strip_prefix("git+").unwrap_or(spec);
    let pkg = pkg.split('#').next().unwrap_or(pkg);

    // For URLs, use the repository name
    if pkg.contains("://") || pkg.starts_with("git@") {
        let name = pkg
            .trim_end_matches('/')
            .rsplit(['/', ':'])
            .next()
            .unwrap_or(pkg)
            .trim_end_matches(".git");
        return Ok(name.to_string());
    }

    // "@scope/name" optionally followed by "@version"
    if let Some(scoped) = pkg.strip_prefix('@') {
        let name = scoped.split('@').next().unwrap_or(scoped);
        if !name.contains('/') {
            return Err(format!("Invalid scoped package name: {}", spec));
        }
        return Ok(format!("@{}", name));
    }

    // Remove @version if present
    let pkg = pkg.split('@').next().unwrap_or(pkg);

    // "github:org/repo" and "org/repo" install under the repository name
    let pkg = pkg.rsplit(':').next().unwrap_or(pkg);
    Ok(pkg.rsplit('/').next().unwrap_or(pkg).to_string())
}
