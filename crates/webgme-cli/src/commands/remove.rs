use super::context;
use crate::components::manager::ComponentManager;
use crate::errors::ComponentError;
use crate::logger;
use crate::GlobalOpts;
use colored::Colorize;
use webgme_manifest::{ComponentKind, Origin};

pub fn handle_remove(
    kind: ComponentKind,
    name: &str,
    opts: &GlobalOpts,
) -> Result<(), ComponentError> {
    let (root, collaborators) = context(opts)?;
    let removal = ComponentManager::new(&root, kind, &collaborators).remove(name)?;

    for path in &removal.skipped {
        logger::warn(&format!("Could not delete {}", path.display()));
    }

    let origin = match removal.removed.origin {
        Origin::Component => "component",
        Origin::Dependency => "dependency",
    };
    println!(
        " {} {} {}",
        "-".bold().red(),
        name.bold(),
        format!("({} {})", kind, origin).dimmed()
    );
    for path in &removal.deleted {
        let shown = path.strip_prefix(&root).unwrap_or(path);
        println!("   {} {}", "deleted".dimmed(), shown.display());
    }
    Ok(())
}
