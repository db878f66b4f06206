//! Generic component manager
//!
//! One engine serves every component kind. The kind's [`KindSpec`] decides
//! where sources go, which configuration field lists them and whether mounting
//! or enabling applies. Every mutation loads the manifest, changes it, saves
//! it and regenerates the runtime configuration from scratch.

use super::generator::{GeneratedFile, Generator};
use super::installer::PackageInstaller;
use super::package_spec::extract_package_name;
use super::runtime::{PluginRuntime, ToggleRequest};
use crate::errors::ComponentError;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use webgme_config::layout;
use webgme_manifest::manifest::normalize_mount;
use webgme_manifest::runtime_config::default_mount;
use webgme_manifest::{
    sync_runtime_config, ComponentKind, ComponentResolver, KindSpec, Listing, Manifest, Origin,
    Record, RegisterMode, Removed,
};

/// Options for creating a component
#[derive(Debug, Clone, Default)]
pub struct NewOptions {
    pub name: String,
    /// Replace an existing component of the same name
    pub force: bool,
}

/// Outcome of a removal, including paths that could not be deleted
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub removed: Removed,
    pub deleted: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// The external collaborators a manager delegates to
pub struct Collaborators {
    pub generator: Box<dyn Generator>,
    pub installer: Box<dyn PackageInstaller>,
    pub runtime: Box<dyn PluginRuntime>,
}

pub struct ComponentManager<'a> {
    root: PathBuf,
    spec: &'static KindSpec,
    collaborators: &'a Collaborators,
}

impl<'a> ComponentManager<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        kind: ComponentKind,
        collaborators: &'a Collaborators,
    ) -> Self {
        ComponentManager {
            root: root.into(),
            spec: kind.spec(),
            collaborators,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.spec.kind
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of the components and dependencies of this kind
    pub fn list(&self) -> Result<Listing, ComponentError> {
        let manifest = Manifest::load(&self.root)?;
        Ok(manifest.list(self.kind()))
    }

    /// Generate a new component, register it and regenerate the runtime configuration
    pub fn new_component(&self, options: &NewOptions) -> Result<Record, ComponentError> {
        let kind = self.kind();
        let mut manifest = Manifest::load(&self.root)?;

        let mode = if options.force {
            RegisterMode::Overwrite
        } else {
            RegisterMode::Strict
        };
        if mode == RegisterMode::Strict && manifest.get(kind, &options.name).is_some() {
            return Err(ComponentError::DuplicateComponent {
                kind,
                name: options.name.clone(),
            });
        }

        let scaffold = self.collaborators.generator.generate(self.spec, &options.name)?;
        for file in &scaffold.files {
            self.write_generated(file)?;
        }

        let record = normalize_record(scaffold.record);
        manifest.register(kind, &options.name, record.clone(), mode)?;
        self.commit(&manifest)?;

        info!("Created {} '{}'", kind, options.name);
        Ok(record)
    }

    /// Drop a component from the manifest and delete the files it owns
    ///
    /// Each path is deleted independently; one that is already gone or cannot be
    /// removed does not stop the others. Dependencies only lose their manifest entry.
    pub fn remove(&self, name: &str) -> Result<Removal, ComponentError> {
        let mut manifest = Manifest::load(&self.root)?;
        let removed = manifest.remove(self.kind(), name)?;

        let mut deleted = Vec::new();
        let mut skipped = Vec::new();
        if removed.origin == Origin::Component {
            for rel in removed.record.local_paths() {
                let Some(path) = self.contained_path(rel) else {
                    debug!("Not deleting {} outside the project root", rel);
                    skipped.push(PathBuf::from(rel));
                    continue;
                };
                match remove_path(&path) {
                    Ok(true) => deleted.push(path),
                    Ok(false) => debug!("{} already gone", path.display()),
                    Err(e) => {
                        debug!("Failed to delete {}: {}", path.display(), e);
                        skipped.push(path);
                    }
                }
            }
        }

        self.commit(&manifest)?;
        info!("Removed {} '{}' from {}", self.kind(), name, removed.origin);
        Ok(Removal {
            removed,
            deleted,
            skipped,
        })
    }

    /// Install `project` and register `name` from it as a dependency
    ///
    /// Nothing in the manifest changes unless both the install and the lookup succeed.
    pub fn import(&self, name: &str, project: &str) -> Result<Record, ComponentError> {
        let kind = self.kind();
        let mut manifest = Manifest::load(&self.root)?;

        self.collaborators.installer.install(&self.root, project)?;

        let package = extract_package_name(project, &self.root).map_err(|reason| {
            ComponentError::DependencyInstallFailed {
                package: project.to_string(),
                reason,
            }
        })?;
        let package_dir = layout::installed_package_dir(&self.root, &package);
        debug!("Looking for {} '{}' in {}", kind, name, package_dir.display());

        let resolution = ComponentResolver::new(&self.root).resolve(&package_dir, kind, name)?;

        let mut record = Record::dependency(package, resolution.relative);
        if self.spec.mountable {
            record = record.with_mount(default_mount(name));
        }
        manifest.register_dependency(kind, name, record.clone(), RegisterMode::Overwrite)?;
        self.commit(&manifest)?;

        info!("Imported {} '{}' from {}", kind, name, project);
        Ok(record)
    }

    /// Change where a router is served
    pub fn mount(&self, name: &str, mount_point: &str) -> Result<String, ComponentError> {
        let kind = self.kind();
        if !self.spec.mountable {
            return Err(ComponentError::NotMountable(kind));
        }

        let mount = normalize_mount(mount_point);
        if mount.is_empty() {
            return Err(ComponentError::InvalidArgs(format!(
                "'{}' is not a valid mount point",
                mount_point
            )));
        }

        let mut manifest = Manifest::load(&self.root)?;
        if manifest.get(kind, name).is_none() {
            return Err(ComponentError::ComponentNotFound {
                kind,
                name: name.to_string(),
            });
        }
        if let Some(owner) = manifest.mount_owner(kind, &mount, name) {
            return Err(ComponentError::MountPointInUse {
                mount,
                owner: owner.to_string(),
            });
        }

        manifest.set_mount(kind, name, &mount)?;
        self.commit(&manifest)?;
        Ok(mount)
    }

    /// Turn a component on in a modeling project
    pub fn enable(&self, name: &str, project: &str, branch: &str) -> Result<(), ComponentError> {
        self.toggle(name, project, branch, true)
    }

    /// Turn a component off in a modeling project
    pub fn disable(&self, name: &str, project: &str, branch: &str) -> Result<(), ComponentError> {
        self.toggle(name, project, branch, false)
    }

    fn toggle(
        &self,
        name: &str,
        project: &str,
        branch: &str,
        enabled: bool,
    ) -> Result<(), ComponentError> {
        let kind = self.kind();
        let Some(registry_key) = self.spec.registry_key else {
            return Err(ComponentError::NotEnableable(kind));
        };

        let manifest = Manifest::load(&self.root)?;
        if manifest.get(kind, name).is_none() {
            return Err(ComponentError::ComponentNotFound {
                kind,
                name: name.to_string(),
            });
        }

        self.collaborators.runtime.toggle(&ToggleRequest {
            root: &self.root,
            registry_key,
            component: name,
            project,
            branch,
            enabled,
        })
    }

    fn commit(&self, manifest: &Manifest) -> Result<(), ComponentError> {
        manifest.save(&self.root)?;
        sync_runtime_config(&self.root, manifest)?;
        Ok(())
    }

    fn write_generated(&self, file: &GeneratedFile) -> Result<(), ComponentError> {
        let rel = layout::to_slash_string(&file.path);
        let path = self.contained_path(&rel).ok_or_else(|| {
            ComponentError::Generator(format!("{} is outside the project root", rel))
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &file.content)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    /// `rel` joined onto the root, if it stays inside it
    fn contained_path(&self, rel: &str) -> Option<PathBuf> {
        let normalized = layout::normalize_separators(rel);
        let rel = Path::new(&normalized);
        let inside = !normalized.is_empty()
            && rel
                .components()
                .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        inside.then(|| self.root.join(rel))
    }
}

fn normalize_record(mut record: Record) -> Record {
    for slot in [
        &mut record.src,
        &mut record.src_path,
        &mut record.test,
        &mut record.widget,
    ] {
        if let Some(path) = slot.as_mut() {
            *path = layout::normalize_separators(path);
        }
    }
    record
}

/// Delete a file or directory tree; `Ok(false)` when it does not exist
fn remove_path(path: &Path) -> std::io::Result<bool> {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return Ok(false);
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(true)
}
