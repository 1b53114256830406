//! Platform targets and the supported platform matrix.
//!
//! A [`PlatformTarget`] is an (OS, architecture) pair the toolchain can
//! compile for. [`MATRIX`] is the fixed, ordered catalog of every supported
//! pair; selections are always resolved against it so that execution order
//! never depends on how the caller enumerated its choices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Target operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    Windows,
    Linux,
}

impl TargetOs {
    /// The toolchain's name for this OS (the `GOOS` value).
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetOs::Windows => "windows",
            TargetOs::Linux => "linux",
        }
    }

    /// Extension appended to executables built for this OS.
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            TargetOs::Windows => ".exe",
            TargetOs::Linux => "",
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetOs {
    type Err = ParsePlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "windows" => Ok(TargetOs::Windows),
            "linux" => Ok(TargetOs::Linux),
            other => Err(ParsePlatformError::UnsupportedOs(other.to_string())),
        }
    }
}

/// Target instruction-set architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetArch {
    Amd64,
    Arm64,
}

impl TargetArch {
    /// The toolchain's name for this architecture (the `GOARCH` value).
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetArch::Amd64 => "amd64",
            TargetArch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetArch {
    type Err = ParsePlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "amd64" => Ok(TargetArch::Amd64),
            "arm64" => Ok(TargetArch::Arm64),
            other => Err(ParsePlatformError::UnsupportedArch(other.to_string())),
        }
    }
}

/// Error parsing a platform selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsePlatformError {
    #[error("unsupported operating system `{0}`; expected one of: windows, linux")]
    UnsupportedOs(String),

    #[error("unsupported architecture `{0}`; expected one of: amd64, arm64")]
    UnsupportedArch(String),

    #[error("platform index {0} is out of range; expected 1..={max}", max = MATRIX.len())]
    IndexOutOfRange(usize),

    #[error("invalid platform `{0}`; expected `os/arch` or a platform index")]
    Malformed(String),
}

/// An (OS, architecture) pair to compile for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformTarget {
    pub os: TargetOs,
    pub arch: TargetArch,
}

/// Every supported target, in catalog order.
pub const MATRIX: [PlatformTarget; 4] = [
    PlatformTarget::new(TargetOs::Windows, TargetArch::Amd64),
    PlatformTarget::new(TargetOs::Windows, TargetArch::Arm64),
    PlatformTarget::new(TargetOs::Linux, TargetArch::Amd64),
    PlatformTarget::new(TargetOs::Linux, TargetArch::Arm64),
];

impl PlatformTarget {
    pub const fn new(os: TargetOs, arch: TargetArch) -> Self {
        PlatformTarget { os, arch }
    }

    /// Position of this target in [`MATRIX`].
    pub fn matrix_index(&self) -> usize {
        match (self.os, self.arch) {
            (TargetOs::Windows, TargetArch::Amd64) => 0,
            (TargetOs::Windows, TargetArch::Arm64) => 1,
            (TargetOs::Linux, TargetArch::Amd64) => 2,
            (TargetOs::Linux, TargetArch::Arm64) => 3,
        }
    }

    /// Look up a target by its 1-based matrix index.
    pub fn from_index(index: usize) -> Result<Self, ParsePlatformError> {
        index
            .checked_sub(1)
            .and_then(|i| MATRIX.get(i))
            .copied()
            .ok_or(ParsePlatformError::IndexOutOfRange(index))
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

impl FromStr for PlatformTarget {
    type Err = ParsePlatformError;

    /// Accepts `os/arch` or a 1-based matrix index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return PlatformTarget::from_index(index);
        }

        let (os, arch) = s
            .split_once('/')
            .ok_or_else(|| ParsePlatformError::Malformed(s.to_string()))?;

        Ok(PlatformTarget::new(os.parse()?, arch.parse()?))
    }
}

/// Check whether an (OS, architecture) name pair is in the matrix.
pub fn is_supported(os: &str, arch: &str) -> bool {
    matches!(
        (os.parse::<TargetOs>(), arch.parse::<TargetArch>()),
        (Ok(_), Ok(_))
    )
}

/// Resolve a target selection against the matrix.
///
/// With `build_all` the full matrix is returned. Otherwise the selection is
/// de-duplicated and returned in matrix order.
pub fn resolve_targets(build_all: bool, selected: &[PlatformTarget]) -> Vec<PlatformTarget> {
    if build_all {
        return MATRIX.to_vec();
    }

    let mut chosen = [false; MATRIX.len()];
    for target in selected {
        chosen[target.matrix_index()] = true;
    }

    MATRIX
        .iter()
        .zip(chosen)
        .filter_map(|(target, keep)| keep.then_some(*target))
        .collect()
}

/// Artifact file name for `package_name` built for `target`.
///
/// Format: `{package}_{os}_{arch}`, with `.exe` for Windows targets.
pub fn output_file_name(package_name: &str, target: &PlatformTarget) -> String {
    format!(
        "{}_{}_{}{}",
        package_name,
        target.os,
        target.arch,
        target.os.exe_suffix()
    )
}
