//! gobake - cross-compile a Go project for a fixed platform matrix
//!
//! This crate provides the library behind the `gobake` CLI: the platform
//! matrix, build configuration, scoped environment overrides and the build
//! orchestrator that drives the compiler once per target.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for gobake unit tests.
///
/// Provides an in-memory environment-backed stub compiler and an event
/// recorder, so orchestration can be tested without a real toolchain.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildReport, Orchestrator};
pub use core::{BuildConfiguration, PlatformTarget};
pub use util::context::GlobalContext;
