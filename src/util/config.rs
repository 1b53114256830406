//! Configuration file support for gobake.
//!
//! gobake reads two configuration files:
//! - Global: `~/.gobake/config.toml` - User-wide defaults
//! - Project: `gobake.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::platform::PlatformTarget;

/// Project configuration file name.
pub const PROJECT_CONFIG_FILE: &str = "gobake.toml";

/// gobake configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Output directory for artifacts
    pub out_dir: Option<PathBuf>,

    /// Artifact base name (defaults to the project directory name)
    pub package: Option<String>,

    /// Compiler command (e.g. `go`, `go1.22`)
    pub compiler: Option<String>,

    /// Enable cgo
    pub cgo: Option<bool>,

    /// Targets to build, as `os/arch` or matrix indices
    pub targets: Option<Vec<String>>,

    /// Build every supported platform
    pub all: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.out_dir.is_some() {
            self.build.out_dir = other.build.out_dir;
        }
        if other.build.package.is_some() {
            self.build.package = other.build.package;
        }
        if other.build.compiler.is_some() {
            self.build.compiler = other.build.compiler;
        }
        if other.build.cgo.is_some() {
            self.build.cgo = other.build.cgo;
        }
        if other.build.targets.is_some() {
            self.build.targets = other.build.targets;
        }
        if other.build.all.is_some() {
            self.build.all = other.build.all;
        }
    }

    /// Parse the configured target list.
    pub fn targets(&self) -> Result<Option<Vec<PlatformTarget>>> {
        self.build
            .targets
            .as_ref()
            .map(|targets| {
                targets
                    .iter()
                    .map(|t| {
                        t.parse::<PlatformTarget>()
                            .with_context(|| format!("invalid target `{}` in configuration", t))
                    })
                    .collect()
            })
            .transpose()
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (gobake.toml)
/// 2. Global config (~/.gobake/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}
