//! The external compiler toolchain.
//!
//! The orchestrator talks to the toolchain through the [`Toolchain`] trait:
//! it asks for the effective value of the target variables and runs the
//! build command. [`GoToolchain`] drives a real `go` binary.

use std::io;
use std::path::Path;
use std::process::ExitStatus;

use crate::util::process::ProcessBuilder;

/// Target operating system variable.
pub const GOOS: &str = "GOOS";

/// Target architecture variable.
pub const GOARCH: &str = "GOARCH";

/// Native interop (cgo) switch, `"1"` or `"0"`.
pub const CGO_ENABLED: &str = "CGO_ENABLED";

/// Variables captured before a build and restored after it.
pub const TRACKED_VARS: [&str; 3] = [GOOS, GOARCH, CGO_ENABLED];

/// Linker flags requesting a stripped, size-reduced binary.
pub const STRIP_LDFLAGS: &str = "-w -s";

/// Exit status of a compiler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileStatus {
    /// Exit code, `None` if the process was terminated by a signal
    pub code: Option<i32>,
}

impl CompileStatus {
    pub fn from_code(code: i32) -> Self {
        CompileStatus { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for CompileStatus {
    fn from(status: ExitStatus) -> Self {
        CompileStatus {
            code: status.code(),
        }
    }
}

/// A compiler toolchain the orchestrator can drive.
pub trait Toolchain {
    /// The compiler command, as configured.
    fn program(&self) -> &str;

    /// The toolchain's effective value for `key`.
    ///
    /// This includes defaults the toolchain applies internally, not only what
    /// the process environment contains. `None` when the toolchain reports
    /// nothing or cannot be queried.
    fn resolve_env(&self, key: &str) -> Option<String>;

    /// The command that builds the current project into `output`.
    fn build_command(&self, output: &Path) -> ProcessBuilder {
        ProcessBuilder::new(self.program())
            .arg("build")
            .arg("-ldflags")
            .arg(STRIP_LDFLAGS)
            .arg("-o")
            .arg(output)
    }

    /// Run `command` to completion with inherited stdout/stderr.
    ///
    /// An `Err` means the process could not be started.
    fn run(&self, command: &ProcessBuilder) -> io::Result<CompileStatus>;
}

/// The Go toolchain, invoked through a configurable command (`go`, `go1.22`, ...).
#[derive(Debug, Clone)]
pub struct GoToolchain {
    program: String,
}

impl GoToolchain {
    pub fn new(program: impl Into<String>) -> Self {
        GoToolchain {
            program: program.into(),
        }
    }
}

impl Toolchain for GoToolchain {
    fn program(&self) -> &str {
        &self.program
    }

    fn resolve_env(&self, key: &str) -> Option<String> {
        let output = match ProcessBuilder::new(&self.program).args(["env", key]).exec() {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!("`{} env {}` failed: {:#}", self.program, key, e);
                return None;
            }
        };

        if !output.status.success() {
            tracing::debug!(
                "`{} env {}` exited with {:?}",
                self.program,
                key,
                output.status.code()
            );
            return None;
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    fn run(&self, command: &ProcessBuilder) -> io::Result<CompileStatus> {
        tracing::debug!("running `{}`", command.display_command());
        command.status().map(CompileStatus::from)
    }
}
