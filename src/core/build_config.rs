//! The resolved configuration a single build runs with.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::platform::{resolve_targets, PlatformTarget};

/// Default output directory, relative to the project.
pub const DEFAULT_OUT_DIR: &str = "./build";

/// Default compiler command.
pub const DEFAULT_COMPILER: &str = "go";

/// Everything the orchestrator needs to know about one build.
///
/// Built once by the configuration layer and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
    /// Directory artifacts are written to (created with parents)
    pub output_directory: PathBuf,

    /// Whether artifacts may link against native code (`CGO_ENABLED`)
    pub cgo_enabled: bool,

    /// Explicit target selection, ignored when `build_all` is set
    pub targets: Vec<PlatformTarget>,

    /// Base name for artifacts
    pub package_name: String,

    /// Build every target in the matrix
    pub build_all: bool,

    /// Compiler command to invoke (e.g. `go`, `go1.22`)
    pub compiler_command: String,
}

impl BuildConfiguration {
    /// Create a configuration that builds every platform with default paths.
    pub fn new(package_name: impl Into<String>) -> Self {
        BuildConfiguration {
            output_directory: PathBuf::from(DEFAULT_OUT_DIR),
            cgo_enabled: false,
            targets: Vec::new(),
            package_name: package_name.into(),
            build_all: true,
            compiler_command: DEFAULT_COMPILER.to_string(),
        }
    }

    pub fn with_output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = dir.into();
        self
    }

    pub fn with_cgo(mut self, enabled: bool) -> Self {
        self.cgo_enabled = enabled;
        self
    }

    /// Select explicit targets. Clears `build_all`.
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = PlatformTarget>) -> Self {
        self.targets = targets.into_iter().collect();
        self.build_all = false;
        self
    }

    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler_command = compiler.into();
        self
    }

    /// The targets this configuration builds, in matrix order.
    pub fn resolved_targets(&self) -> Vec<PlatformTarget> {
        resolve_targets(self.build_all, &self.targets)
    }
}
