use super::context_with_tools;
use crate::components::manager::ComponentManager;
use crate::errors::ComponentError;
use crate::logger;
use crate::GlobalOpts;
use webgme_manifest::ComponentKind;

/// Where an enable/disable request applies
#[derive(Debug, Clone)]
pub struct ToggleTarget {
    pub project: String,
    pub branch: String,
}

pub fn handle_toggle(
    kind: ComponentKind,
    name: &str,
    target: &ToggleTarget,
    enabled: bool,
    opts: &GlobalOpts,
) -> Result<(), ComponentError> {
    let (root, collaborators) = context_with_tools(opts)?;
    let manager = ComponentManager::new(&root, kind, &collaborators);

    logger::spinner_start(&format!(
        "{} {} '{}' in {}",
        if enabled { "Enabling" } else { "Disabling" },
        kind,
        name,
        target.project
    ));
    let result = if enabled {
        manager.enable(name, &target.project, &target.branch)
    } else {
        manager.disable(name, &target.project, &target.branch)
    };

    match result {
        Ok(()) => {
            logger::spinner_success(&format!(
                "{} {} '{}' in {} ({})",
                if enabled { "Enabled" } else { "Disabled" },
                kind,
                name,
                target.project,
                target.branch
            ));
            Ok(())
        }
        Err(e) => {
            logger::spinner_stop();
            Err(e)
        }
    }
}
