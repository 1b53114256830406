//! Cross-compilation driver.
//!
//! This module scopes the compiler's target variables, invokes the compiler
//! once per platform and reports progress as build events.

pub mod env;
pub mod events;
pub mod orchestrator;
pub mod toolchain;

pub use env::{EnvScope, EnvSnapshot, EnvStore, MemoryEnv, ProcessEnv};
pub use events::{BuildEvent, EventSink, NullSink};
pub use orchestrator::{BuildError, BuildReport, BuildResult, Orchestrator, TargetError};
pub use toolchain::{CompileStatus, GoToolchain, Toolchain};
