//! High-level operations.
//!
//! This module contains the implementation of gobake commands.

pub mod gobake_build;
pub mod gobake_env;

pub use gobake_build::{build, resolve_configuration, BuildOptions, BuildSummary};
pub use gobake_env::{current_environment, host_default, EnvReport, ResolvedVar, ValueSource};
