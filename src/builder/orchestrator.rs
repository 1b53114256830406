//! Multi-platform build orchestration.
//!
//! The [`Orchestrator`] builds one project for every resolved target, one
//! target at a time:
//!
//! 1. Create the output directory (before touching the environment).
//! 2. For each target in matrix order, set `GOOS`, `GOARCH` and `CGO_ENABLED`,
//!    then run the compiler with inherited stdio.
//! 3. Stop at the first failing target.
//! 4. Restore the environment snapshot, whatever happened in step 2.
//!
//! Target selection goes through process-global environment variables, so
//! builds are strictly sequential and no other thread may touch the
//! environment while [`Orchestrator::build`] runs.

use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::builder::env::{EnvError, EnvScope, EnvSnapshot, EnvStore, RestoreError};
use crate::builder::events::{BuildEvent, EnvVar, EventSink};
use crate::builder::toolchain::{Toolchain, CGO_ENABLED, GOARCH, GOOS, TRACKED_VARS};
use crate::core::build_config::BuildConfiguration;
use crate::core::platform::{output_file_name, PlatformTarget};
use crate::util::fs::create_output_dir;

/// Why a single target failed.
#[derive(Debug, Error)]
pub enum TargetError {
    /// The compiler could not be started.
    #[error("failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The compiler ran and reported failure.
    #[error("`{command}` exited with {}", describe_exit(.code))]
    Exit { command: String, code: Option<i32> },

    /// A target variable could not be set.
    #[error("failed to set target environment")]
    Environment(#[from] EnvError),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Error from a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to create output directory `{}`", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("build for {target} failed")]
    Target {
        target: PlatformTarget,
        #[source]
        source: TargetError,
    },

    #[error(transparent)]
    Restore(#[from] RestoreError),
}

/// Outcome for one target.
#[derive(Debug)]
pub enum BuildResult {
    Success {
        target: PlatformTarget,
        artifact: PathBuf,
    },
    Failure {
        target: PlatformTarget,
        error: TargetError,
    },
}

impl BuildResult {
    pub fn target(&self) -> PlatformTarget {
        match self {
            BuildResult::Success { target, .. } | BuildResult::Failure { target, .. } => *target,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildResult::Success { .. })
    }
}

/// Everything a finished build produced.
///
/// Target results and the restore outcome are kept apart: a failed restore
/// never changes what happened to the targets.
#[derive(Debug)]
pub struct BuildReport {
    /// Results in build order. Ends at the first failure.
    pub results: Vec<BuildResult>,
    /// Outcome of putting the environment back
    pub restore: Result<(), RestoreError>,
    pub duration: Duration,
}

impl BuildReport {
    fn empty(duration: Duration) -> Self {
        BuildReport {
            results: Vec::new(),
            restore: Ok(()),
            duration,
        }
    }

    /// Whether every target built and the environment was restored.
    pub fn is_success(&self) -> bool {
        self.results.iter().all(BuildResult::is_success) && self.restore.is_ok()
    }

    /// Paths of every artifact built, in build order.
    pub fn artifacts(&self) -> impl Iterator<Item = (PlatformTarget, &PathBuf)> {
        self.results.iter().filter_map(|r| match r {
            BuildResult::Success { target, artifact } => Some((*target, artifact)),
            BuildResult::Failure { .. } => None,
        })
    }

    /// The failing target, if any.
    pub fn failure(&self) -> Option<(PlatformTarget, &TargetError)> {
        self.results.iter().find_map(|r| match r {
            BuildResult::Failure { target, error } => Some((*target, error)),
            BuildResult::Success { .. } => None,
        })
    }

    /// Fold the report into a single result.
    ///
    /// A target failure takes precedence over a restore failure; in that case
    /// the restore failure is logged.
    pub fn into_result(self) -> Result<Vec<PathBuf>, BuildError> {
        let mut artifacts = Vec::new();
        let mut failed = None;

        for result in self.results {
            match result {
                BuildResult::Success { artifact, .. } => artifacts.push(artifact),
                BuildResult::Failure { target, error } => {
                    failed = Some(BuildError::Target {
                        target,
                        source: error,
                    })
                }
            }
        }

        match (failed, self.restore) {
            (Some(err), Err(restore)) => {
                tracing::error!("{}", restore);
                Err(err)
            }
            (Some(err), Ok(())) => Err(err),
            (None, Err(restore)) => Err(BuildError::Restore(restore)),
            (None, Ok(())) => Ok(artifacts),
        }
    }
}

/// Builds one project for every selected platform.
///
/// The snapshot of the toolchain environment is captured when the
/// orchestrator is created. Nothing else may write `GOOS`, `GOARCH` or
/// `CGO_ENABLED` between construction and the end of [`build`](Self::build).
pub struct Orchestrator<T: Toolchain, E: EnvStore> {
    config: BuildConfiguration,
    toolchain: T,
    env: E,
    snapshot: EnvSnapshot,
}

impl<T: Toolchain, E: EnvStore> Orchestrator<T, E> {
    /// Create an orchestrator and capture the environment snapshot.
    pub fn new(config: BuildConfiguration, toolchain: T, env: E) -> Self {
        let snapshot = EnvSnapshot::capture(&toolchain);
        Orchestrator {
            config,
            toolchain,
            env,
            snapshot,
        }
    }

    pub fn snapshot(&self) -> &EnvSnapshot {
        &self.snapshot
    }

    /// Build every resolved target.
    ///
    /// Returns `Err` only when the output directory cannot be created, in
    /// which case the environment was never touched. Target failures and
    /// restore failures are reported in the [`BuildReport`].
    ///
    /// An empty target selection is not an error: a warning is logged and
    /// emitted, no directory is created, no variable is written and the
    /// returned report is successful with no results.
    pub fn build(&self, sink: &dyn EventSink) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        let targets = self.config.resolved_targets();

        if targets.is_empty() {
            let msg = "no target platforms selected, nothing to build";
            tracing::warn!("{}", msg);
            sink.emit(&BuildEvent::warning(msg));
            sink.emit(&BuildEvent::finished(true, elapsed_ms(start), 0));
            return Ok(BuildReport::empty(start.elapsed()));
        }

        let out_dir = &self.config.output_directory;
        create_output_dir(out_dir).map_err(|source| BuildError::DirectoryCreation {
            path: out_dir.clone(),
            source,
        })?;
        sink.emit(&BuildEvent::OutputDirectory {
            path: out_dir.clone(),
        });

        sink.emit(&BuildEvent::TargetsResolved {
            targets: targets.clone(),
        });

        let mut scope = EnvScope::new(&self.env, &self.snapshot);
        let mut results = Vec::with_capacity(targets.len());
        let total = targets.len();

        for (i, target) in targets.into_iter().enumerate() {
            sink.emit(&BuildEvent::section(format!("Building {}", target)));
            tracing::debug!("building {} ({}/{})", target, i + 1, total);

            match self.build_target(&scope, target, i + 1, total, sink) {
                Ok(artifact) => {
                    sink.emit(&BuildEvent::artifact(target, artifact.clone()));
                    results.push(BuildResult::Success { target, artifact });
                }
                Err(error) => {
                    sink.emit(&BuildEvent::TargetFailed {
                        target,
                        message: error_chain(&error),
                    });
                    results.push(BuildResult::Failure { target, error });
                    break;
                }
            }
        }

        sink.emit(&BuildEvent::section("Restoring environment"));
        let restore = scope.restore();
        match &restore {
            Ok(()) => sink.emit(&BuildEvent::EnvironmentRestored {
                vars: self.resolved_vars(),
            }),
            Err(err) => sink.emit(&BuildEvent::RestoreFailed {
                message: err.to_string(),
            }),
        }

        let report = BuildReport {
            results,
            restore,
            duration: start.elapsed(),
        };

        sink.emit(&BuildEvent::finished(
            report.is_success(),
            elapsed_ms(start),
            report.artifacts().count() as u64,
        ));

        Ok(report)
    }

    fn build_target(
        &self,
        scope: &EnvScope<'_>,
        target: PlatformTarget,
        index: usize,
        total: usize,
        sink: &dyn EventSink,
    ) -> Result<PathBuf, TargetError> {
        let cgo = if self.config.cgo_enabled { "1" } else { "0" };

        scope.set(GOOS, target.os.as_str())?;
        scope.set(GOARCH, target.arch.as_str())?;
        scope.set(CGO_ENABLED, cgo)?;

        // Telemetry only: a toolchain that ignores the override is left to
        // succeed or fail on its own.
        let goos = self.toolchain.resolve_env(GOOS);
        let goarch = self.toolchain.resolve_env(GOARCH);
        let cgo_enabled = self.toolchain.resolve_env(CGO_ENABLED);

        if goos.as_deref() != Some(target.os.as_str())
            || goarch.as_deref() != Some(target.arch.as_str())
        {
            tracing::warn!(
                "toolchain resolved {}/{} while building {}",
                goos.as_deref().unwrap_or("unknown"),
                goarch.as_deref().unwrap_or("unknown"),
                target
            );
        }

        sink.emit(&BuildEvent::Environment {
            target,
            index,
            total,
            goos: goos.unwrap_or_else(|| "unknown".to_string()),
            goarch: goarch.unwrap_or_else(|| "unknown".to_string()),
            cgo_enabled: cgo_enabled.unwrap_or_else(|| "unknown".to_string()),
            compiler: self.toolchain.program().to_string(),
        });

        let output = self
            .config
            .output_directory
            .join(output_file_name(&self.config.package_name, &target));

        let command = self
            .toolchain
            .build_command(&output)
            .env(GOOS, target.os.as_str())
            .env(GOARCH, target.arch.as_str())
            .env(CGO_ENABLED, cgo);
        let display = command.display_command();

        sink.emit(&BuildEvent::Command {
            target,
            program: command.get_program().display().to_string(),
            args: command.get_args().to_vec(),
            command_line: display.clone(),
        });

        let status = self
            .toolchain
            .run(&command)
            .map_err(|source| TargetError::Spawn {
                command: display.clone(),
                source,
            })?;

        if !status.success() {
            return Err(TargetError::Exit {
                command: display,
                code: status.code,
            });
        }

        tracing::debug!("built {} -> {}", target, output.display());
        Ok(output)
    }

    fn resolved_vars(&self) -> Vec<EnvVar> {
        TRACKED_VARS
            .iter()
            .map(|key| {
                let value = self
                    .toolchain
                    .resolve_env(key)
                    .unwrap_or_else(|| "unknown".to_string());
                EnvVar::new(*key, value)
            })
            .collect()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// `err: cause: cause` for event messages.
fn error_chain(err: &dyn StdError) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
