//! Manifest operations - loading, saving, and business logic
//!
//! The manifest is read-modify-written without locking: two concurrent
//! invocations against one project can lose an update.

use crate::errors::ManifestError;
use crate::kinds::ComponentKind;
use crate::runtime_config::default_mount;
use crate::types::{Listing, Manifest, Origin, Record, RegisterMode, Removed};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use webgme_config::layout;

impl Manifest {
    /// A manifest with every recognized kind present and empty
    pub fn empty() -> Self {
        let mut manifest = Manifest::default();
        manifest.ensure_all_kinds();
        manifest
    }

    /// Load the manifest of the project rooted at `root`
    pub fn load(root: &Path) -> Result<Self, ManifestError> {
        Self::load_from_path(&layout::manifest_path(root))
    }

    /// Load a manifest file, normalizing missing kinds to empty mappings
    pub fn load_from_path(path: &Path) -> Result<Self, ManifestError> {
        if !path.is_file() {
            return Err(ManifestError::Missing(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let mut manifest: Manifest =
            serde_json::from_str(&content).map_err(|source| ManifestError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;
        manifest.ensure_all_kinds();
        debug!("Loaded manifest from {}", path.display());
        Ok(manifest)
    }

    /// Save the manifest into the project rooted at `root`
    pub fn save(&self, root: &Path) -> Result<(), ManifestError> {
        self.save_to_path(&layout::manifest_path(root))
    }

    /// Save to a specific path with atomic write
    pub fn save_to_path(&self, path: &Path) -> Result<(), ManifestError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.to_pretty_string()?;

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension("json.tmp");
        {
            let file = std::fs::File::create(&temp_path)?;
            let mut writer = std::io::BufWriter::new(file);
            writer.write_all(content.as_bytes())?;
            writer.flush()?;
        }

        std::fs::rename(&temp_path, path)?;
        debug!("Saved manifest to {}", path.display());
        Ok(())
    }

    /// Multi-line, 2-space indented JSON with a trailing newline
    pub fn to_pretty_string(&self) -> Result<String, ManifestError> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        Ok(content)
    }

    /// Make sure `kind` exists (possibly empty) in both mappings
    pub fn ensure_kind(&mut self, kind: ComponentKind) -> &mut Self {
        let key = kind.manifest_key();
        self.components.entry(key.to_string()).or_default();
        self.dependencies.entry(key.to_string()).or_default();
        self
    }

    pub fn ensure_all_kinds(&mut self) -> &mut Self {
        for kind in ComponentKind::ALL {
            self.ensure_kind(kind);
        }
        self
    }

    fn table(&self, origin: Origin) -> &BTreeMap<String, BTreeMap<String, Record>> {
        match origin {
            Origin::Component => &self.components,
            Origin::Dependency => &self.dependencies,
        }
    }

    fn table_mut(&mut self, origin: Origin) -> &mut BTreeMap<String, BTreeMap<String, Record>> {
        match origin {
            Origin::Component => &mut self.components,
            Origin::Dependency => &mut self.dependencies,
        }
    }

    /// Records of one kind from one mapping
    pub fn entries(&self, origin: Origin, kind: ComponentKind) -> Option<&BTreeMap<String, Record>> {
        self.table(origin).get(kind.manifest_key())
    }

    /// All records of a kind, components first
    pub fn records(&self, kind: ComponentKind) -> impl Iterator<Item = (Origin, &str, &Record)> {
        [Origin::Component, Origin::Dependency]
            .into_iter()
            .filter_map(move |origin| self.entries(origin, kind).map(|entries| (origin, entries)))
            .flat_map(|(origin, entries)| {
                entries
                    .iter()
                    .map(move |(name, record)| (origin, name.as_str(), record))
            })
    }

    /// Look a component up in `components`, then in `dependencies`
    pub fn get(&self, kind: ComponentKind, name: &str) -> Option<(Origin, &Record)> {
        [Origin::Component, Origin::Dependency]
            .into_iter()
            .find_map(|origin| {
                self.entries(origin, kind)
                    .and_then(|entries| entries.get(name))
                    .map(|record| (origin, record))
            })
    }

    /// Register a locally generated component
    ///
    /// Returns the record that was replaced, if any (only in overwrite mode).
    pub fn register(
        &mut self,
        kind: ComponentKind,
        name: &str,
        record: Record,
        mode: RegisterMode,
    ) -> Result<Option<Record>, ManifestError> {
        self.insert(Origin::Component, kind, name, record, mode)
    }

    /// Register a component imported from another project
    pub fn register_dependency(
        &mut self,
        kind: ComponentKind,
        name: &str,
        record: Record,
        mode: RegisterMode,
    ) -> Result<Option<Record>, ManifestError> {
        self.insert(Origin::Dependency, kind, name, record, mode)
    }

    fn insert(
        &mut self,
        origin: Origin,
        kind: ComponentKind,
        name: &str,
        record: Record,
        mode: RegisterMode,
    ) -> Result<Option<Record>, ManifestError> {
        self.ensure_kind(kind);
        let entries = self
            .table_mut(origin)
            .entry(kind.manifest_key().to_string())
            .or_default();

        if mode == RegisterMode::Strict && entries.contains_key(name) {
            return Err(ManifestError::DuplicateComponent {
                kind,
                name: name.to_string(),
            });
        }

        debug!("Registering {} '{}' in {}", kind, name, origin);
        Ok(entries.insert(name.to_string(), record))
    }

    /// Remove a component from whichever mapping holds it
    pub fn remove(&mut self, kind: ComponentKind, name: &str) -> Result<Removed, ManifestError> {
        for origin in [Origin::Component, Origin::Dependency] {
            let removed = self
                .table_mut(origin)
                .get_mut(kind.manifest_key())
                .and_then(|entries| entries.remove(name));

            if let Some(record) = removed {
                debug!("Removed {} '{}' from {}", kind, name, origin);
                return Ok(Removed { record, origin });
            }
        }

        Err(ManifestError::ComponentNotFound {
            kind,
            name: name.to_string(),
        })
    }

    /// Names registered for `kind`, sorted
    pub fn list(&self, kind: ComponentKind) -> Listing {
        let names = |origin: Origin| -> Vec<String> {
            self.entries(origin, kind)
                .map(|entries| entries.keys().cloned().collect())
                .unwrap_or_default()
        };

        Listing {
            components: names(Origin::Component),
            dependencies: names(Origin::Dependency),
        }
    }

    /// The component (other than `except`) already mounted at `mount`
    ///
    /// A record without a mount of its own claims its default mount.
    pub fn mount_owner(&self, kind: ComponentKind, mount: &str, except: &str) -> Option<&str> {
        let wanted = normalize_mount(mount);
        self.records(kind)
            .filter(|(_, name, _)| *name != except)
            .find(|(_, name, record)| effective_mount(name, record) == wanted)
            .map(|(_, name, _)| name)
    }

    /// Update the mount field of a registered component in place
    pub fn set_mount(
        &mut self,
        kind: ComponentKind,
        name: &str,
        mount: &str,
    ) -> Result<(), ManifestError> {
        for origin in [Origin::Component, Origin::Dependency] {
            if let Some(record) = self
                .table_mut(origin)
                .get_mut(kind.manifest_key())
                .and_then(|entries| entries.get_mut(name))
            {
                record.mount = Some(normalize_mount(mount));
                return Ok(());
            }
        }

        Err(ManifestError::ComponentNotFound {
            kind,
            name: name.to_string(),
        })
    }

    /// Count registered components across all kinds
    pub fn total_count(&self) -> usize {
        ComponentKind::ALL
            .into_iter()
            .map(|kind| self.records(kind).count())
            .sum()
    }
}

/// Mount point a router record is served under
pub fn effective_mount(name: &str, record: &Record) -> String {
    record
        .mount
        .as_deref()
        .map(normalize_mount)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| default_mount(name))
}

/// Mount points are stored without leading or trailing slashes
pub fn normalize_mount(mount: &str) -> String {
    layout::normalize_separators(mount)
        .trim_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifest_with_plugin() -> Manifest {
        let mut manifest = Manifest::empty();
        let registered = manifest.register(
            ComponentKind::Plugin,
            "Foo",
            Record::local("src/plugins/Foo").with_test("test/plugins/Foo"),
            RegisterMode::Strict,
        );
        assert!(registered.is_ok_and(|previous| previous.is_none()));
        manifest
    }

    #[test]
    fn test_empty_manifest_has_every_kind() {
        let manifest = Manifest::empty();
        for kind in ComponentKind::ALL {
            assert!(manifest.entries(Origin::Component, kind).is_some());
            assert!(manifest.entries(Origin::Dependency, kind).is_some());
        }
        assert_eq!(manifest.total_count(), 0);
    }

    #[test]
    fn test_ensure_kind_is_idempotent() {
        let mut once = Manifest::default();
        once.ensure_kind(ComponentKind::Seed);
        let mut twice = once.clone();
        twice.ensure_kind(ComponentKind::Seed);
        assert_eq!(once, twice);

        let mut populated = manifest_with_plugin();
        let before = populated.clone();
        populated.ensure_kind(ComponentKind::Plugin).ensure_all_kinds();
        assert_eq!(populated, before);
    }

    #[test]
    fn test_load_normalizes_missing_kinds() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join(layout::MANIFEST_FILE);
        let raw = r#"{"components": {"plugins": {"Foo": {"src": "src/plugins/Foo"}}}}"#;
        if std::fs::write(&path, raw).is_err() {
            return;
        }

        let loaded = Manifest::load(temp_dir.path());
        assert!(loaded.is_ok_and(|m| {
            m.entries(Origin::Dependency, ComponentKind::Plugin)
                .is_some_and(|e| e.is_empty())
                && m.entries(Origin::Component, ComponentKind::Router).is_some()
                && m.get(ComponentKind::Plugin, "Foo").is_some()
        }));
    }

    #[test]
    fn test_load_missing_manifest() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let result = Manifest::load(temp_dir.path());
        assert!(matches!(result, Err(ManifestError::Missing(_))));
    }

    #[test]
    fn test_load_corrupt_manifest() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        if std::fs::write(temp_dir.path().join(layout::MANIFEST_FILE), "{ not json").is_err() {
            return;
        }
        let result = Manifest::load(temp_dir.path());
        assert!(matches!(result, Err(ManifestError::Corrupt { .. })));
    }

    #[test]
    fn test_save_load_is_fixed_point() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let mut manifest = manifest_with_plugin();
        manifest.extra.insert(
            "version".to_string(),
            serde_json::Value::String("1.0.0".to_string()),
        );
        let dep = Record::dependency("webgme-widgets", "node_modules/webgme-widgets/src/plugins/Bar");
        assert!(manifest
            .register_dependency(ComponentKind::Plugin, "Bar", dep, RegisterMode::Strict)
            .is_ok());
        assert!(manifest.save(temp_dir.path()).is_ok());

        let path = layout::manifest_path(temp_dir.path());
        let Ok(first) = std::fs::read_to_string(&path) else {
            return;
        };

        let Ok(reloaded) = Manifest::load(temp_dir.path()) else {
            panic!("saved manifest should load");
        };
        assert!(reloaded.save(temp_dir.path()).is_ok());
        let Ok(second) = std::fs::read_to_string(&path) else {
            return;
        };

        assert_eq!(first, second);
        assert!(first.ends_with("}\n"));
        assert!(first.contains("\n  \"components\""));
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let raw = r#"{
            "components": {"plugins": {"Foo": {"srcPath": "src/plugins/Foo", "owner": "team"}}},
            "dependencies": {"widgets": {}}
        }"#;
        let Ok(mut manifest) = serde_json::from_str::<Manifest>(raw) else {
            panic!("fixture should parse");
        };
        manifest.ensure_all_kinds();

        assert!(manifest.dependencies.contains_key("widgets"));
        let Some((_, record)) = manifest.get(ComponentKind::Plugin, "Foo") else {
            panic!("Foo should be registered");
        };
        assert_eq!(record.source_path(), Some("src/plugins/Foo"));
        assert!(record.extra.contains_key("owner"));
    }

    #[test]
    fn test_register_strict_rejects_duplicates() {
        let mut manifest = manifest_with_plugin();
        let result = manifest.register(
            ComponentKind::Plugin,
            "Foo",
            Record::local("src/plugins/Other"),
            RegisterMode::Strict,
        );
        assert!(matches!(
            result,
            Err(ManifestError::DuplicateComponent { kind: ComponentKind::Plugin, .. })
        ));

        let replaced = manifest.register(
            ComponentKind::Plugin,
            "Foo",
            Record::local("src/plugins/Other"),
            RegisterMode::Overwrite,
        );
        assert!(replaced.is_ok_and(|previous| previous.is_some()));
    }

    #[test]
    fn test_register_then_remove_restores_state() {
        let mut manifest = manifest_with_plugin();
        let before = manifest.clone();

        assert!(manifest
            .register(
                ComponentKind::Decorator,
                "FancyDecorator",
                Record::local("src/decorators/FancyDecorator"),
                RegisterMode::Strict,
            )
            .is_ok());
        let removed = manifest.remove(ComponentKind::Decorator, "FancyDecorator");

        assert!(removed.is_ok_and(|r| r.origin == Origin::Component));
        assert_eq!(manifest, before);
    }

    #[test]
    fn test_remove_probes_dependencies() {
        let mut manifest = Manifest::empty();
        let dep = Record::dependency("webgme-seeds", "node_modules/webgme-seeds/src/seeds/Base");
        assert!(manifest
            .register_dependency(ComponentKind::Seed, "Base", dep.clone(), RegisterMode::Strict)
            .is_ok());

        let removed = manifest.remove(ComponentKind::Seed, "Base");
        assert!(removed.is_ok_and(|r| r.origin == Origin::Dependency && r.record == dep));

        let missing = manifest.remove(ComponentKind::Seed, "Base");
        assert!(matches!(missing, Err(ManifestError::ComponentNotFound { .. })));
    }

    #[test]
    fn test_list_splits_origins() {
        let mut manifest = manifest_with_plugin();
        let dep = Record::dependency("webgme-widgets", "node_modules/webgme-widgets/src/plugins/Bar");
        assert!(manifest
            .register_dependency(ComponentKind::Plugin, "Bar", dep, RegisterMode::Strict)
            .is_ok());

        let listing = manifest.list(ComponentKind::Plugin);
        assert_eq!(listing.components, vec!["Foo".to_string()]);
        assert_eq!(listing.dependencies, vec!["Bar".to_string()]);
        assert!(manifest.list(ComponentKind::Layout).is_empty());
    }

    #[test]
    fn test_mount_owner_ignores_slashes_and_self() {
        let mut manifest = Manifest::empty();
        let record = Record::local("src/routers/RouterA").with_mount("api/a");
        assert!(manifest
            .register(ComponentKind::Router, "RouterA", record, RegisterMode::Strict)
            .is_ok());

        assert_eq!(
            manifest.mount_owner(ComponentKind::Router, "/api/a/", "RouterB"),
            Some("RouterA")
        );
        assert_eq!(manifest.mount_owner(ComponentKind::Router, "/api/a", "RouterA"), None);
        assert_eq!(manifest.mount_owner(ComponentKind::Router, "/api/b", "RouterB"), None);
    }

    #[test]
    fn test_mount_owner_sees_default_mounts() {
        let mut manifest = Manifest::empty();
        assert!(manifest
            .register(
                ComponentKind::Router,
                "RouterA",
                Record::local("src/routers/RouterA"),
                RegisterMode::Strict,
            )
            .is_ok());

        assert_eq!(
            manifest.mount_owner(ComponentKind::Router, "routers/RouterA", "RouterB"),
            Some("RouterA")
        );
        assert_eq!(
            manifest.mount_owner(ComponentKind::Router, "/routers/RouterA/", "RouterA"),
            None
        );
    }

    #[test]
    fn test_normalize_mount() {
        assert_eq!(normalize_mount("/api/a/"), "api/a");
        assert_eq!(normalize_mount("routers\\Foo"), "routers/Foo");
    }
}
