//! Core data structures for gobake.
//!
//! - The supported platform matrix and target parsing
//! - The build configuration a single run executes with

pub mod build_config;
pub mod platform;

pub use build_config::BuildConfiguration;
pub use platform::{output_file_name, resolve_targets, PlatformTarget, TargetArch, TargetOs, MATRIX};
