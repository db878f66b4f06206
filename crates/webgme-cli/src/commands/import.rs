use super::context_with_tools;
use crate::components::manager::ComponentManager;
use crate::errors::ComponentError;
use crate::logger;
use crate::GlobalOpts;
use colored::Colorize;
use webgme_manifest::ComponentKind;

pub fn handle_import(
    kind: ComponentKind,
    name: &str,
    project: &str,
    opts: &GlobalOpts,
) -> Result<(), ComponentError> {
    let (root, collaborators) = context_with_tools(opts)?;
    logger::step(&format!("Importing {} '{}' from {}", kind, name, project));
    let record = ComponentManager::new(&root, kind, &collaborators).import(name, project)?;

    logger::success(&format!("Imported {} '{}' from {}", kind, name, project));
    if let Some(path) = &record.path {
        println!(" {} {} {}", "+".bold().green(), name.bold(), path.dimmed());
    }
    Ok(())
}
