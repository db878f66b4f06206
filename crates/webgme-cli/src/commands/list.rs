use super::context;
use crate::components::manager::ComponentManager;
use crate::errors::ComponentError;
use crate::GlobalOpts;
use colored::Colorize;
use webgme_manifest::ComponentKind;

pub fn handle_list(kind: Option<ComponentKind>, opts: &GlobalOpts) -> Result<(), ComponentError> {
    let (root, collaborators) = context(opts)?;
    let kinds = kind.map_or_else(|| ComponentKind::ALL.to_vec(), |k| vec![k]);

    let mut total = 0usize;
    for kind in kinds {
        let listing = ComponentManager::new(&root, kind, &collaborators).list()?;
        if listing.is_empty() {
            continue;
        }

        println!("{}", format!("{}:", kind.manifest_key()).bold().green());
        for name in &listing.components {
            println!("    - {}", name);
        }
        for name in &listing.dependencies {
            println!("    - {} {}", name, "(dependency)".dimmed());
        }
        println!();
        total += listing.components.len() + listing.dependencies.len();
    }

    if total == 0 {
        match kind {
            Some(kind) => println!("There are no {} components in this project.", kind),
            None => println!("There are no components in this project."),
        }
        println!();
        println!(
            "To create one, run:\n  {} new <kind> <name>",
            "webgme".bold().cyan()
        );
        return Ok(());
    }

    println!("{}: {}", "Total components".bold(), total);
    Ok(())
}
