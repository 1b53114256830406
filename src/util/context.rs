//! Global context for gobake operations.
//!
//! Provides centralized access to the working directory and configuration paths.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::util::config::{load_config, Config, PROJECT_CONFIG_FILE};
use crate::util::fs::dir_name;

/// Global context containing paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global gobake data (~/.gobake/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = directories::BaseDirs::new()
            .map(|b| b.home_dir().join(".gobake"))
            .unwrap_or_else(|| PathBuf::from(".gobake"));

        Ok(GlobalContext { cwd, home })
    }

    /// Create a GlobalContext with explicit directories.
    pub fn with_dirs(cwd: PathBuf, home: PathBuf) -> Self {
        GlobalContext { cwd, home }
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Get the project configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        self.cwd.join(PROJECT_CONFIG_FILE)
    }

    /// Load global and project configuration, merged.
    pub fn load_config(&self) -> Config {
        load_config(&self.config_path(), &self.project_config_path())
    }

    /// Default package name: the working directory's name.
    pub fn default_package_name(&self) -> Result<String> {
        dir_name(&self.cwd).with_context(|| {
            format!(
                "cannot derive a package name from `{}`; pass --package",
                self.cwd.display()
            )
        })
    }
}
