//! Common types and utilities shared across modules

use crate::errors::ComponentError;
use clap::Parser;
use std::path::PathBuf;
use webgme_config::locate_root;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Decrease verbosity")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,

    #[arg(
        long,
        global = true,
        value_name = "DIR",
        help = "Start the project search here instead of the current directory"
    )]
    pub root: Option<PathBuf>,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: quiet/warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Root of the project the command operates on
    pub fn project_root(&self) -> Result<PathBuf, ComponentError> {
        let start = match &self.root {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        Ok(locate_root(&start)?)
    }
}
