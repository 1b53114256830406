//! Build events.
//!
//! The orchestrator reports progress as a stream of [`BuildEvent`]s delivered
//! to an [`EventSink`]. It does no terminal formatting itself; the CLI shell
//! renders events as status lines or, with `--message-format=json`, as one
//! JSON object per line.
//!
//! # Event Types
//!
//! - `section`: A new phase of the build started
//! - `output-directory`: The output directory was created
//! - `targets-resolved`: The ordered list of targets about to be built
//! - `environment`: The toolchain's effective target variables for a target
//! - `compiler-invocation`: The literal compiler command, before it runs
//! - `compiler-artifact`: A target built successfully
//! - `target-failed`: A target failed; no further targets are built
//! - `environment-restored` / `restore-failed`: Outcome of the post-build restore
//! - `build-finished`: Aggregate status

use std::path::PathBuf;

use serde::Serialize;

use crate::core::platform::PlatformTarget;

/// A name/value pair as the toolchain reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        EnvVar {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A build event emitted during the build process.
///
/// Each event is serialized as a single JSON object per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    /// A new phase of the build started.
    #[serde(rename = "section")]
    Section { title: String },

    /// The output directory exists.
    #[serde(rename = "output-directory")]
    OutputDirectory { path: PathBuf },

    /// Targets that will be built, in build order.
    #[serde(rename = "targets-resolved")]
    TargetsResolved { targets: Vec<PlatformTarget> },

    /// Effective environment after the per-target override.
    #[serde(rename = "environment")]
    Environment {
        target: PlatformTarget,
        /// Index of the target in this build, starting at 1
        index: usize,
        total: usize,
        goos: String,
        goarch: String,
        cgo_enabled: String,
        compiler: String,
    },

    /// The compiler command about to run.
    #[serde(rename = "compiler-invocation")]
    Command {
        target: PlatformTarget,
        program: String,
        args: Vec<String>,
        /// Printable form, arguments with whitespace quoted
        command_line: String,
    },

    /// A target was built.
    #[serde(rename = "compiler-artifact")]
    Artifact {
        target: PlatformTarget,
        path: PathBuf,
    },

    /// A target failed to build.
    #[serde(rename = "target-failed")]
    TargetFailed {
        target: PlatformTarget,
        message: String,
    },

    /// The environment was put back; values are the toolchain's view afterwards.
    #[serde(rename = "environment-restored")]
    EnvironmentRestored { vars: Vec<EnvVar> },

    /// One or more variables could not be restored.
    #[serde(rename = "restore-failed")]
    RestoreFailed { message: String },

    /// A generic diagnostic message.
    #[serde(rename = "diagnostic")]
    Diagnostic {
        /// Severity level ("error", "warning", "note")
        level: String,
        message: String,
    },

    /// Build completed (success or failure).
    #[serde(rename = "build-finished")]
    BuildFinished {
        success: bool,
        duration_ms: u64,
        targets_built: u64,
    },
}

impl BuildEvent {
    /// Create a section event.
    pub fn section(title: impl Into<String>) -> Self {
        BuildEvent::Section {
            title: title.into(),
        }
    }

    /// Create an artifact event.
    pub fn artifact(target: PlatformTarget, path: impl Into<PathBuf>) -> Self {
        BuildEvent::Artifact {
            target,
            path: path.into(),
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        BuildEvent::Diagnostic {
            level: "warning".to_string(),
            message: message.into(),
        }
    }

    /// Create a build finished event.
    pub fn finished(success: bool, duration_ms: u64, targets_built: u64) -> Self {
        BuildEvent::BuildFinished {
            success,
            duration_ms,
            targets_built,
        }
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Receiver for build events.
pub trait EventSink {
    fn emit(&self, event: &BuildEvent);
}

impl<F> EventSink for F
where
    F: Fn(&BuildEvent),
{
    fn emit(&self, event: &BuildEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &BuildEvent) {}
}
