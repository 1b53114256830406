//! Implementation of `gobake env`.
//!
//! Reports the target variables the toolchain would use right now. When the
//! toolchain reports nothing (not installed, or no value), the host's own
//! platform stands in.

use std::path::PathBuf;

use serde::Serialize;

use crate::builder::toolchain::{Toolchain, CGO_ENABLED, GOARCH, GOOS, TRACKED_VARS};
use crate::util::process::find_executable;

/// Where a reported value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueSource {
    Toolchain,
    HostDefault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVar {
    pub name: String,
    pub value: String,
    pub source: ValueSource,
}

/// The toolchain's current view of the target variables.
#[derive(Debug, Clone, Serialize)]
pub struct EnvReport {
    pub compiler: String,
    /// Location of the compiler in PATH, if found
    pub compiler_path: Option<PathBuf>,
    pub vars: Vec<ResolvedVar>,
}

/// Host fallback for a tracked variable, using the toolchain's naming.
pub fn host_default(key: &str) -> Option<String> {
    let value = match key {
        GOOS => match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        },
        GOARCH => match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            other => other,
        },
        CGO_ENABLED => {
            if cfg!(windows) {
                "0"
            } else {
                "1"
            }
        }
        _ => return None,
    };
    Some(value.to_string())
}

/// Resolve every tracked variable through `toolchain`, falling back to host defaults.
pub fn current_environment(toolchain: &dyn Toolchain) -> EnvReport {
    let vars = TRACKED_VARS
        .iter()
        .filter_map(|key| {
            let (value, source) = match toolchain.resolve_env(key) {
                Some(value) => (value, ValueSource::Toolchain),
                None => (host_default(key)?, ValueSource::HostDefault),
            };
            Some(ResolvedVar {
                name: key.to_string(),
                value,
                source,
            })
        })
        .collect();

    EnvReport {
        compiler: toolchain.program().to_string(),
        compiler_path: find_executable(toolchain.program()),
        vars,
    }
}
