//! Command implementations

pub mod build;
pub mod completions;
pub mod env;
pub mod targets;
