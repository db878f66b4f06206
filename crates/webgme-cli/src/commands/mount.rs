use super::context;
use crate::components::manager::ComponentManager;
use crate::errors::ComponentError;
use crate::logger;
use crate::GlobalOpts;
use webgme_manifest::ComponentKind;

pub fn handle_mount(
    router: &str,
    mount_point: &str,
    opts: &GlobalOpts,
) -> Result<(), ComponentError> {
    let (root, collaborators) = context(opts)?;
    let manager = ComponentManager::new(&root, ComponentKind::Router, &collaborators);
    let mount = manager.mount(router, mount_point)?;

    logger::success(&format!("Router '{}' mounted at /{}", router, mount));
    Ok(())
}
