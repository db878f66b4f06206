use crate::errors::ComponentError;
use crate::logger;
use crate::project::init_project;
use crate::GlobalOpts;
use colored::Colorize;
use std::path::PathBuf;

pub fn handle_init(dir: Option<PathBuf>, _opts: &GlobalOpts) -> Result<(), ComponentError> {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let root = init_project(&dir)?;

    logger::success(&format!("Initialized webgme project in {}", root.display()));
    println!();
    println!("To create a component, run:");
    println!("  {} new plugin <Name>", "webgme".bold().cyan());
    Ok(())
}
