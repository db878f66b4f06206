use super::context;
use crate::components::manager::{ComponentManager, NewOptions};
use crate::errors::ComponentError;
use crate::logger;
use crate::GlobalOpts;
use colored::Colorize;
use webgme_manifest::ComponentKind;

pub fn handle_new(
    kind: ComponentKind,
    name: &str,
    force: bool,
    opts: &GlobalOpts,
) -> Result<(), ComponentError> {
    let (root, collaborators) = context(opts)?;
    let manager = ComponentManager::new(&root, kind, &collaborators);
    logger::step(&format!("Generating {} '{}' in {}", kind, name, root.display()));

    let record = manager.new_component(&NewOptions {
        name: name.to_string(),
        force,
    })?;

    logger::success(&format!("Created {} '{}'", kind, name));
    for path in record.local_paths() {
        println!(" {} {}", "+".bold().green(), path);
    }
    if let Some(mount) = &record.mount {
        println!("   {} /{}", "mounted at".dimmed(), mount);
    }
    Ok(())
}
