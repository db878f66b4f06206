//! Component management: the generic manager and its collaborators

pub mod generator;
pub mod installer;
pub mod manager;
pub mod package_spec;
pub mod runtime;

use crate::errors::ComponentError;
use crate::logger;
use generator::TemplateGenerator;
use installer::NpmInstaller;
use manager::Collaborators;
use runtime::NodePluginRuntime;
use webgme_config::Settings;

/// Collaborators backed by the templates and the npm and node from the user settings
pub fn default_collaborators() -> Result<Collaborators, ComponentError> {
    build(&load_settings()?)
}

/// Like [`default_collaborators`], discovering npm and node on PATH first
///
/// Discovered paths are saved to the settings file.
pub fn collaborators_with_tools() -> Result<Collaborators, ComponentError> {
    let mut settings = load_settings()?;
    if let Err(e) = settings.ensure_npm_path() {
        logger::debug(&format!("Falling back to 'npm' on PATH: {}", e));
    }
    if let Err(e) = settings.ensure_node_path() {
        logger::debug(&format!("Falling back to 'node' on PATH: {}", e));
    }
    build(&settings)
}

fn load_settings() -> Result<Settings, ComponentError> {
    Settings::load().map_err(|e| ComponentError::Settings(e.to_string()))
}

fn build(settings: &Settings) -> Result<Collaborators, ComponentError> {
    Ok(Collaborators {
        generator: Box::new(TemplateGenerator::new()?),
        installer: Box::new(NpmInstaller::from_settings(settings)),
        runtime: Box::new(NodePluginRuntime::from_settings(settings)),
    })
}
