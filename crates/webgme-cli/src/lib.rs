//! webgme CLI library - expose modules for testing
//!
//! This library exposes core modules needed for testing and integration.

pub mod commands;
pub mod common;
pub mod components;
pub mod errors;
pub mod project;

pub use common::GlobalOpts;
pub use webgme_logger as logger;
