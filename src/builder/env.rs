//! Environment snapshot and scoped override.
//!
//! The toolchain picks its target from process environment variables, so a
//! build mutates `GOOS`, `GOARCH` and `CGO_ENABLED` once per target. This
//! module captures the values the toolchain observed before any mutation and
//! puts them back afterwards.
//!
//! Writes go through the [`EnvStore`] trait. [`ProcessEnv`] is the real
//! process environment; [`MemoryEnv`] is an in-memory store for embedding and
//! tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use thiserror::Error;

use crate::builder::toolchain::{Toolchain, TRACKED_VARS};

/// Error writing a single environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("invalid environment variable name `{0}`")]
    InvalidKey(String),

    #[error("value for `{0}` contains a NUL byte")]
    InvalidValue(String),

    #[error("failed to write `{key}`: {message}")]
    Write { key: String, message: String },
}

/// A place environment variables are read from and written to.
pub trait EnvStore {
    /// Current value of `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`.
    fn set(&self, key: &str, value: &str) -> Result<(), EnvError>;

    /// Unset `key`.
    fn remove(&self, key: &str) -> Result<(), EnvError>;
}

fn validate_key(key: &str) -> Result<(), EnvError> {
    if key.is_empty() || key.contains('=') || key.contains('\0') {
        return Err(EnvError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// The environment of the current process.
///
/// Writes are process-global. Callers must ensure no other thread reads or
/// writes the environment while a build is running.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EnvError> {
        validate_key(key)?;
        if value.contains('\0') {
            return Err(EnvError::InvalidValue(key.to_string()));
        }
        std::env::set_var(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), EnvError> {
        validate_key(key)?;
        std::env::remove_var(key);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryEnvInner {
    vars: BTreeMap<String, String>,
    rejected: HashSet<String>,
    writes: usize,
}

/// An in-memory environment.
///
/// Clones share the same variables, so a toolchain stub can observe what the
/// orchestrator writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnv {
    inner: Rc<RefCell<MemoryEnvInner>>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a variable without counting it as a write.
    pub fn with_var(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner
            .borrow_mut()
            .vars
            .insert(key.into(), value.into());
        self
    }

    /// Make every subsequent write to `key` fail.
    pub fn reject_writes_to(&self, key: impl Into<String>) {
        self.inner.borrow_mut().rejected.insert(key.into());
    }

    /// Number of successful writes (sets and removes) so far.
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }

    /// A copy of every variable currently set.
    pub fn vars(&self) -> BTreeMap<String, String> {
        self.inner.borrow().vars.clone()
    }

    fn check_writable(&self, key: &str) -> Result<(), EnvError> {
        validate_key(key)?;
        if self.inner.borrow().rejected.contains(key) {
            return Err(EnvError::Write {
                key: key.to_string(),
                message: "write rejected".to_string(),
            });
        }
        Ok(())
    }
}

impl EnvStore for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().vars.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EnvError> {
        self.check_writable(key)?;
        let mut inner = self.inner.borrow_mut();
        inner.vars.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), EnvError> {
        self.check_writable(key)?;
        let mut inner = self.inner.borrow_mut();
        inner.vars.remove(key);
        inner.writes += 1;
        Ok(())
    }
}

/// A value as the toolchain reported it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EnvValue {
    Set(String),
    /// The toolchain reported nothing for this variable.
    Unknown,
}

impl EnvValue {
    /// Wrap a toolchain answer, treating `None` as unknown.
    pub fn from_resolved(value: Option<String>) -> Self {
        match value {
            Some(v) => EnvValue::Set(v),
            None => EnvValue::Unknown,
        }
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            EnvValue::Set(v) => Some(v),
            EnvValue::Unknown => None,
        }
    }
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvValue::Set(v) => f.write_str(v),
            EnvValue::Unknown => f.write_str("unknown"),
        }
    }
}

/// The toolchain-relevant variables as observed before a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSnapshot {
    values: Vec<(String, EnvValue)>,
}

impl EnvSnapshot {
    /// Capture every tracked variable from the toolchain's effective environment.
    pub fn capture(toolchain: &dyn Toolchain) -> Self {
        let values = TRACKED_VARS
            .iter()
            .map(|key| {
                let value = EnvValue::from_resolved(toolchain.resolve_env(key));
                tracing::debug!("captured {} = {}", key, value);
                (key.to_string(), value)
            })
            .collect();

        EnvSnapshot { values }
    }

    /// Captured value for `key`.
    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Captured variables in tracking order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One or more variables could not be restored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to restore environment: {}", describe_failures(.failures))]
pub struct RestoreError {
    pub failures: Vec<(String, EnvError)>,
}

fn describe_failures(failures: &[(String, EnvError)]) -> String {
    failures
        .iter()
        .map(|(key, err)| format!("{} ({})", key, err))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write `snapshot` back into `env`.
///
/// Every variable is attempted even if an earlier one fails; failures are
/// collected into a single error. `Unknown` values are removed.
pub fn restore_snapshot(env: &dyn EnvStore, snapshot: &EnvSnapshot) -> Result<(), RestoreError> {
    let mut failures = Vec::new();

    for (key, value) in snapshot.iter() {
        tracing::debug!("restoring {} = {}", key, value);
        let result = match value {
            EnvValue::Set(v) => env.set(key, v),
            EnvValue::Unknown => env.remove(key),
        };
        if let Err(err) = result {
            failures.push((key.to_string(), err));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(RestoreError { failures })
    }
}

/// Scoped environment override.
///
/// Variables set through the scope are reverted to the snapshot by
/// [`EnvScope::restore`]. If the scope is dropped without an explicit
/// restore, the drop performs it and logs any failure.
pub struct EnvScope<'a> {
    env: &'a dyn EnvStore,
    snapshot: &'a EnvSnapshot,
    restored: bool,
}

impl<'a> EnvScope<'a> {
    pub fn new(env: &'a dyn EnvStore, snapshot: &'a EnvSnapshot) -> Self {
        EnvScope {
            env,
            snapshot,
            restored: false,
        }
    }

    /// Override `key` for the lifetime of the scope.
    pub fn set(&self, key: &str, value: &str) -> Result<(), EnvError> {
        tracing::debug!("setting {} = {}", key, value);
        self.env.set(key, value)
    }

    /// Revert to the snapshot. Only the first call does any work.
    pub fn restore(&mut self) -> Result<(), RestoreError> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        restore_snapshot(self.env, self.snapshot)
    }

    pub fn is_restored(&self) -> bool {
        self.restored
    }
}

impl Drop for EnvScope<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::error!("{}", err);
        }
    }
}
