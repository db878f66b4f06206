//! Locating a named component inside another project
//!
//! Resolution is two-tiered. A project built with this tool exposes its own
//! manifest, which is authoritative. Any other framework project is searched
//! through the path lists of its configuration files. Either way the hit is
//! turned into a directory and expressed relative to the consuming project.

use crate::config_reader::{find_config_files, read_config_document};
use crate::errors::ManifestError;
use crate::kinds::{ComponentKind, ConfigTarget};
use crate::types::Manifest;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use webgme_config::layout;

/// Which lookup found the component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    ForeignManifest,
    RuntimeConfig(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Component directory as found on disk
    pub absolute: PathBuf,
    /// The same directory relative to the consuming project root, forward slashes
    pub relative: String,
    pub strategy: Strategy,
}

pub struct ComponentResolver {
    consuming_root: PathBuf,
}

impl ComponentResolver {
    pub fn new(consuming_root: impl Into<PathBuf>) -> Self {
        ComponentResolver {
            consuming_root: consuming_root.into(),
        }
    }

    /// Find `name` of `kind` in the project at `project_dir`
    pub fn resolve(
        &self,
        project_dir: &Path,
        kind: ComponentKind,
        name: &str,
    ) -> Result<Resolution, ManifestError> {
        let found = self
            .from_foreign_manifest(project_dir, kind, name)
            .map(|path| (path, Strategy::ForeignManifest))
            .or_else(|| {
                self.from_runtime_config(project_dir, kind, name)
                    .map(|(path, config)| (path, Strategy::RuntimeConfig(config)))
            });

        let Some((path, strategy)) = found else {
            return Err(ManifestError::Unresolved {
                kind,
                name: name.to_string(),
                project: project_dir.to_path_buf(),
            });
        };

        let directory = if path.is_dir() {
            path
        } else {
            path.parent().map_or(path.clone(), Path::to_path_buf)
        };
        let absolute = layout::normalize_lexically(&directory);
        let relative = layout::relative_to(&absolute, &self.consuming_root)
            .map_or_else(|| layout::to_slash_string(&absolute), |rel| layout::to_slash_string(&rel));

        debug!("Resolved {} '{}' to {} ({:?})", kind, name, relative, strategy);
        Ok(Resolution {
            absolute,
            relative,
            strategy,
        })
    }

    fn from_foreign_manifest(
        &self,
        project_dir: &Path,
        kind: ComponentKind,
        name: &str,
    ) -> Option<PathBuf> {
        let manifest = match Manifest::load(project_dir) {
            Ok(manifest) => manifest,
            Err(ManifestError::Missing(_)) => return None,
            Err(e) => {
                warn!("Ignoring unreadable manifest in {}: {}", project_dir.display(), e);
                return None;
            }
        };

        let (_, record) = manifest.get(kind, name)?;
        let recorded = record.registered_path()?;
        existing(&project_dir.join(layout::normalize_separators(recorded)))
    }

    fn from_runtime_config(
        &self,
        project_dir: &Path,
        kind: ComponentKind,
        name: &str,
    ) -> Option<(PathBuf, PathBuf)> {
        for config_file in find_config_files(project_dir) {
            let doc = match read_config_document(&config_file) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("Skipping {}: {}", config_file.display(), e);
                    continue;
                }
            };
            let config_dir = config_file.parent().unwrap_or(project_dir);

            let hit = match kind.spec().config {
                ConfigTarget::PathList(field) => doc
                    .paths(field)
                    .iter()
                    .find_map(|entry| search_base_path(&anchor(config_dir, entry), name)),
                ConfigTarget::RestComponents => doc
                    .rest_components
                    .get(name)
                    .and_then(|component| existing(&anchor(config_dir, &component.src))),
            };

            if let Some(path) = hit {
                return Some((path, config_file));
            }
        }
        None
    }
}

fn anchor(config_dir: &Path, entry: &str) -> PathBuf {
    let entry = Path::new(entry);
    if entry.is_absolute() {
        entry.to_path_buf()
    } else {
        config_dir.join(entry)
    }
}

/// A base path either contains the component or is the component itself
fn search_base_path(base: &Path, name: &str) -> Option<PathBuf> {
    existing(&base.join(name)).or_else(|| {
        let is_named = base
            .file_name()
            .is_some_and(|file| file == name || Path::new(file).file_stem().is_some_and(|s| s == name));
        if is_named {
            existing(base)
        } else {
            None
        }
    })
}

/// The path itself, or the path with a `.js` extension appended
fn existing(candidate: &Path) -> Option<PathBuf> {
    if candidate.exists() {
        return Some(candidate.to_path_buf());
    }

    let mut with_js: OsString = candidate.as_os_str().to_owned();
    with_js.push(".js");
    let with_js = PathBuf::from(with_js);
    with_js.exists().then_some(with_js)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        root: TempDir,
    }

    impl Fixture {
        fn new() -> Option<Self> {
            Some(Fixture {
                root: TempDir::new().ok()?,
            })
        }

        fn consuming_root(&self) -> &Path {
            self.root.path()
        }

        fn foreign(&self) -> PathBuf {
            self.root.path().join("node_modules").join("webgme-widgets")
        }

        fn mkdir(&self, rel: &str) -> bool {
            fs::create_dir_all(self.foreign().join(rel)).is_ok()
        }

        fn write(&self, rel: &str, content: &str) -> bool {
            let path = self.foreign().join(rel);
            path.parent().is_some_and(|p| fs::create_dir_all(p).is_ok())
                && fs::write(path, content).is_ok()
        }
    }

    #[test]
    fn test_resolve_from_config_base_path() {
        let Some(fx) = Fixture::new() else {
            return;
        };
        if !fx.mkdir("config/widgets/Foo")
            || !fx.write("config/config.json", r#"{"plugin": {"basePaths": ["./widgets"]}}"#)
        {
            return;
        }

        let resolver = ComponentResolver::new(fx.consuming_root());
        let result = resolver.resolve(&fx.foreign(), ComponentKind::Plugin, "Foo");

        let Ok(resolution) = result else {
            panic!("Foo should resolve: {:?}", result);
        };
        assert!(resolution.relative.ends_with("widgets/Foo"));
        assert_eq!(
            resolution.relative,
            "node_modules/webgme-widgets/config/widgets/Foo"
        );
        assert!(matches!(resolution.strategy, Strategy::RuntimeConfig(_)));
    }

    #[test]
    fn test_foreign_manifest_wins_over_config_scan() {
        let Some(fx) = Fixture::new() else {
            return;
        };
        let manifest = r#"{"components": {"plugins": {"Foo": {"src": "src/plugins/Foo"}}}, "dependencies": {}}"#;
        if !fx.mkdir("src/plugins/Foo")
            || !fx.mkdir("config/widgets/Foo")
            || !fx.write(layout::MANIFEST_FILE, manifest)
            || !fx.write("config/config.json", r#"{"plugin": {"basePaths": ["./widgets"]}}"#)
        {
            return;
        }

        let resolver = ComponentResolver::new(fx.consuming_root());
        let result = resolver.resolve(&fx.foreign(), ComponentKind::Plugin, "Foo");

        assert!(result.is_ok_and(|r| r.strategy == Strategy::ForeignManifest
            && r.relative == "node_modules/webgme-widgets/src/plugins/Foo"));
    }

    #[test]
    fn test_resolve_js_file_uses_parent_directory() {
        let Some(fx) = Fixture::new() else {
            return;
        };
        let config = "config.visualization.decoratorPaths.push(__dirname + '/../src/decorators');\n";
        if !fx.write("src/decorators/FooDecorator.js", "define([], function () {});")
            || !fx.write("config/config.webgme.js", config)
        {
            return;
        }

        let resolver = ComponentResolver::new(fx.consuming_root());
        let result = resolver.resolve(&fx.foreign(), ComponentKind::Decorator, "FooDecorator");

        assert!(result.is_ok_and(|r| r.relative == "node_modules/webgme-widgets/src/decorators"));
    }

    #[test]
    fn test_resolve_base_path_naming_the_component() {
        let Some(fx) = Fixture::new() else {
            return;
        };
        let config = "config.seedProjects.basePaths.push(__dirname + '/../src/seeds/Base');\n";
        if !fx.mkdir("src/seeds/Base") || !fx.write("config/config.webgme.js", config) {
            return;
        }

        let resolver = ComponentResolver::new(fx.consuming_root());
        let result = resolver.resolve(&fx.foreign(), ComponentKind::Seed, "Base");

        assert!(result.is_ok_and(|r| r.relative == "node_modules/webgme-widgets/src/seeds/Base"));
    }

    #[test]
    fn test_resolve_router_from_rest_table() {
        let Some(fx) = Fixture::new() else {
            return;
        };
        let config = "config.rest.components['Search'] = {src: __dirname + '/../src/routers/Search/Search.js', mount: 'search', options: {}};\n";
        if !fx.write("src/routers/Search/Search.js", "module.exports = {};")
            || !fx.write("config/config.default.js", config)
        {
            return;
        }

        let resolver = ComponentResolver::new(fx.consuming_root());
        let result = resolver.resolve(&fx.foreign(), ComponentKind::Router, "Search");

        assert!(result.is_ok_and(|r| r.relative == "node_modules/webgme-widgets/src/routers/Search"));
    }

    #[test]
    fn test_resolve_not_found() {
        let Some(fx) = Fixture::new() else {
            return;
        };
        if !fx.write("config/config.json", r#"{"plugin": {"basePaths": ["./widgets"]}}"#) {
            return;
        }

        let resolver = ComponentResolver::new(fx.consuming_root());
        let result = resolver.resolve(&fx.foreign(), ComponentKind::Plugin, "Missing");
        assert!(matches!(result, Err(ManifestError::Unresolved { .. })));
    }
}
