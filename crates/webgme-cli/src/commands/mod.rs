pub mod config;
pub mod enable;
pub mod import;
pub mod init;
pub mod list;
pub mod mount;
pub mod new;
pub mod remove;

use crate::components::manager::Collaborators;
use crate::components::{collaborators_with_tools, default_collaborators};
use crate::errors::ComponentError;
use crate::logger;
use crate::GlobalOpts;
use std::path::PathBuf;

/// Project root and collaborators for a component command
fn context(opts: &GlobalOpts) -> Result<(PathBuf, Collaborators), ComponentError> {
    let root = project_root(opts)?;
    Ok((root, default_collaborators()?))
}

/// Like [`context`], for commands that run npm or node
fn context_with_tools(opts: &GlobalOpts) -> Result<(PathBuf, Collaborators), ComponentError> {
    let root = project_root(opts)?;
    Ok((root, collaborators_with_tools()?))
}

fn project_root(opts: &GlobalOpts) -> Result<PathBuf, ComponentError> {
    let root = opts.project_root()?;
    logger::debug(&format!("Project root: {}", root.display()));
    Ok(root)
}
