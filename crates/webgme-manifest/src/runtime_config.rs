//! Runtime configuration regeneration
//!
//! The framework reads its component directories from a generated CommonJS
//! module. That module is never patched: every manifest mutation rebuilds a
//! typed [`ConfigDocument`] from the manifest and re-renders the whole file.

use crate::errors::ManifestError;
use crate::kinds::{ComponentKind, ConfigTarget};
use crate::manifest::effective_mount;
use crate::types::Manifest;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use webgme_config::layout;

const GENERATED_HEADER: &str = "\
// DO NOT EDIT THIS FILE
// This file is generated by webgme-cli from webgme-setup.json.
'use strict';

var config = require('webgme/config/config.default'),
    validateConfig = require('webgme/config/validator');
";

const GENERATED_FOOTER: &str = "
validateConfig(config);
module.exports = config;
";

/// One entry of the `rest.components` router table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestComponent {
    /// Router module, relative to the project root (or absolute)
    pub src: String,
    pub mount: String,
}

/// Typed view of the path-bearing parts of a framework configuration
///
/// Keys are dotted configuration fields (`plugin.basePaths`, `addOn.enable`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    pub path_lists: BTreeMap<String, Vec<String>>,
    pub flags: BTreeMap<String, bool>,
    pub rest_components: BTreeMap<String, RestComponent>,
}

impl ConfigDocument {
    pub fn paths(&self, field: &str) -> &[String] {
        self.path_lists.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        self.flags.get(field).copied()
    }

    /// Append a path with forward slashes; empty and duplicate entries are skipped
    pub fn push_path(&mut self, field: &str, path: &str) -> bool {
        let normalized = layout::normalize_separators(path);
        let list = self.path_lists.entry(field.to_string()).or_default();
        if normalized.is_empty() || list.contains(&normalized) {
            return false;
        }
        list.push(normalized);
        true
    }

    /// Render as the generated configuration module
    ///
    /// Relative paths are rooted at the project root, so they are emitted
    /// relative to `__dirname` (the config directory) with one `..` hop.
    pub fn render(&self) -> String {
        let mut out = String::from(GENERATED_HEADER);

        for (field, paths) in &self.path_lists {
            if paths.is_empty() {
                continue;
            }
            out.push('\n');
            for path in paths {
                out.push_str(&format!("config.{}.push({});\n", field, path_expr(path)));
            }
        }

        if !self.flags.is_empty() {
            out.push('\n');
            for (field, enabled) in &self.flags {
                out.push_str(&format!("config.{} = {};\n", field, enabled));
            }
        }

        if !self.rest_components.is_empty() {
            out.push('\n');
            for (name, component) in &self.rest_components {
                out.push_str(&format!(
                    "config.rest.components['{}'] = {{src: {}, mount: '{}', options: {{}}}};\n",
                    js_escape(name),
                    path_expr(&component.src),
                    js_escape(&component.mount)
                ));
            }
        }

        out.push_str(GENERATED_FOOTER);
        out
    }
}

/// Mount point a router gets when its record does not name one
pub fn default_mount(name: &str) -> String {
    format!("routers/{}", name)
}

/// Build the runtime configuration for `manifest`
///
/// Pure: the same manifest always yields the same document. Components and
/// dependencies both contribute, paths are normalized and deduplicated, and an
/// enable flag is `true` exactly when its kind has at least one entry.
///
/// A path list gets each component's own directory (`src/plugins/Foo`), not
/// the shared parent the framework would otherwise scan for `<Name>/<Name>.js`.
pub fn regenerate(manifest: &Manifest) -> ConfigDocument {
    let mut doc = ConfigDocument::default();

    for kind in ComponentKind::ALL {
        let spec = kind.spec();
        match spec.config {
            ConfigTarget::PathList(field) => {
                doc.path_lists.entry(field.to_string()).or_default();
                for (_, _, record) in manifest.records(kind) {
                    if let Some(path) = record.registered_path() {
                        doc.push_path(field, path);
                    }
                }
                if let Some(flag) = spec.enable_flag {
                    let enabled = !doc.paths(field).is_empty();
                    doc.flags.insert(flag.to_string(), enabled);
                }
            }
            ConfigTarget::RestComponents => {
                for (_, name, record) in manifest.records(kind) {
                    let Some(path) = record.registered_path() else {
                        continue;
                    };
                    let path = layout::normalize_separators(path);
                    if path.is_empty() {
                        continue;
                    }
                    let src = if path.ends_with(".js") {
                        path
                    } else {
                        format!("{}/{}.js", path, name)
                    };
                    let mount = effective_mount(name, record);

                    // components come first, so a local router wins a name clash
                    doc.rest_components
                        .entry(name.to_string())
                        .or_insert(RestComponent { src, mount });
                }
            }
        }
    }

    doc
}

/// Write a rendered document to the project's generated configuration file
pub fn write_runtime_config(root: &Path, doc: &ConfigDocument) -> Result<PathBuf, ManifestError> {
    let path = layout::runtime_config_path(root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("js.tmp");
    {
        let file = std::fs::File::create(&temp_path)?;
        let mut writer = std::io::BufWriter::new(file);
        writer.write_all(doc.render().as_bytes())?;
        writer.flush()?;
    }
    std::fs::rename(&temp_path, &path)?;

    debug!("Wrote runtime config to {}", path.display());
    Ok(path)
}

/// Regenerate and write the runtime configuration for the project at `root`
pub fn sync_runtime_config(root: &Path, manifest: &Manifest) -> Result<ConfigDocument, ManifestError> {
    let doc = regenerate(manifest);
    write_runtime_config(root, &doc)?;
    info!(
        "Runtime config regenerated ({} component(s))",
        manifest.total_count()
    );
    Ok(doc)
}

fn is_absolute_like(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/') || (bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic())
}

fn path_expr(path: &str) -> String {
    if is_absolute_like(path) {
        format!("'{}'", js_escape(path))
    } else {
        format!("__dirname + '/../{}'", js_escape(path))
    }
}

fn js_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Record, RegisterMode};
    use tempfile::TempDir;

    fn register(manifest: &mut Manifest, kind: ComponentKind, name: &str, src: &str) {
        let result = manifest.register(kind, name, Record::local(src), RegisterMode::Strict);
        assert!(result.is_ok(), "register {} failed", name);
    }

    #[test]
    fn test_regenerate_lists_every_registered_path_once() {
        let mut manifest = Manifest::empty();
        register(&mut manifest, ComponentKind::Plugin, "Foo", "src/plugins/Foo");
        register(&mut manifest, ComponentKind::Plugin, "Bar", "src\\plugins\\Bar");
        register(&mut manifest, ComponentKind::Plugin, "Blank", "");
        let dep = Record::dependency("webgme-foo", "./src/plugins/Foo/");
        assert!(manifest
            .register_dependency(ComponentKind::Plugin, "FooAgain", dep, RegisterMode::Strict)
            .is_ok());
        let dotted = Record::dependency("webgme-foo", "src/./plugins/Foo");
        assert!(manifest
            .register_dependency(ComponentKind::Plugin, "FooDotted", dotted, RegisterMode::Strict)
            .is_ok());

        let doc = regenerate(&manifest);
        assert_eq!(
            doc.paths("plugin.basePaths").to_vec(),
            vec!["src/plugins/Bar".to_string(), "src/plugins/Foo".to_string()]
        );
    }

    #[test]
    fn test_regenerate_is_pure() {
        let mut manifest = Manifest::empty();
        register(&mut manifest, ComponentKind::Decorator, "FooDecorator", "src/decorators/FooDecorator");
        assert_eq!(regenerate(&manifest), regenerate(&manifest));
    }

    #[test]
    fn test_enable_flags_follow_entries() {
        let mut manifest = Manifest::empty();
        let doc = regenerate(&manifest);
        assert_eq!(doc.flag("addOn.enable"), Some(false));
        assert_eq!(doc.flag("seedProjects.enable"), Some(false));

        register(&mut manifest, ComponentKind::AddOn, "Watcher", "src/addOns/Watcher");
        assert_eq!(regenerate(&manifest).flag("addOn.enable"), Some(true));

        assert!(manifest.remove(ComponentKind::AddOn, "Watcher").is_ok());
        assert_eq!(regenerate(&manifest).flag("addOn.enable"), Some(false));
    }

    #[test]
    fn test_router_table() {
        let mut manifest = Manifest::empty();
        let record = Record::local("src/routers/Search").with_mount("/api/search/");
        assert!(manifest
            .register(ComponentKind::Router, "Search", record, RegisterMode::Strict)
            .is_ok());
        register(&mut manifest, ComponentKind::Router, "Plain", "src/routers/Plain");

        let doc = regenerate(&manifest);
        assert_eq!(
            doc.rest_components.get("Search"),
            Some(&RestComponent {
                src: "src/routers/Search/Search.js".to_string(),
                mount: "api/search".to_string(),
            })
        );
        assert!(doc
            .rest_components
            .get("Plain")
            .is_some_and(|c| c.mount == "routers/Plain"));
    }

    #[test]
    fn test_render_generated_module() {
        let mut manifest = Manifest::empty();
        register(&mut manifest, ComponentKind::Plugin, "Foo", "src/plugins/Foo");
        register(&mut manifest, ComponentKind::Router, "Api", "src/routers/Api");

        let rendered = regenerate(&manifest).render();
        assert!(rendered.starts_with("// DO NOT EDIT THIS FILE"));
        assert!(rendered.contains("config.plugin.basePaths.push(__dirname + '/../src/plugins/Foo');"));
        assert!(rendered.contains("config.addOn.enable = false;"));
        assert!(rendered.contains(
            "config.rest.components['Api'] = {src: __dirname + '/../src/routers/Api/Api.js', mount: 'routers/Api', options: {}};"
        ));
        assert!(rendered.ends_with("module.exports = config;\n"));
    }

    #[test]
    fn test_render_absolute_paths_as_literals() {
        let mut doc = ConfigDocument::default();
        doc.push_path("plugin.basePaths", "/opt/shared/plugins");
        assert!(doc
            .render()
            .contains("config.plugin.basePaths.push('/opt/shared/plugins');"));
    }

    #[test]
    fn test_sync_writes_config_file() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let mut manifest = Manifest::empty();
        register(&mut manifest, ComponentKind::Seed, "Base", "src/seeds/Base");

        let doc = sync_runtime_config(temp_dir.path(), &manifest);
        assert!(doc.is_ok_and(|d| d.flag("seedProjects.enable") == Some(true)));

        let written = std::fs::read_to_string(layout::runtime_config_path(temp_dir.path()));
        assert!(written.is_ok_and(|content| content
            .contains("config.seedProjects.basePaths.push(__dirname + '/../src/seeds/Base');")));
    }
}
