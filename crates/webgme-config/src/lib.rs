//! Shared configuration for the webgme CLI crates
//!
//! `layout` knows where things live inside a consuming project and how to find
//! the project root; `settings` holds the user-level CLI settings file.

pub mod layout;
pub mod settings;

pub use layout::{locate_root, LayoutError};
pub use settings::Settings;
