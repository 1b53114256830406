//! Test doubles for gobake unit tests.
//!
//! [`StubToolchain`] stands in for the Go toolchain: it resolves variables
//! from a shared [`MemoryEnv`] and records every compiler run instead of
//! spawning a process. [`RecordingSink`] keeps every emitted event.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::rc::Rc;

use crate::builder::env::{EnvStore, MemoryEnv};
use crate::builder::events::{BuildEvent, EventSink};
use crate::builder::toolchain::{CompileStatus, Toolchain, CGO_ENABLED, GOARCH, GOOS, TRACKED_VARS};
use crate::core::platform::PlatformTarget;
use crate::util::process::ProcessBuilder;

/// One recorded compiler run.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// `GOOS` in the environment at the time of the run
    pub goos: Option<String>,
    /// `GOARCH` in the environment at the time of the run
    pub goarch: Option<String>,
    /// `CGO_ENABLED` in the environment at the time of the run
    pub cgo_enabled: Option<String>,
    pub args: Vec<String>,
    /// Tracked variables passed explicitly to the child
    pub child_env: BTreeMap<String, String>,
}

impl Invocation {
    /// The target the orchestrator asked the child to build.
    pub fn target(&self) -> PlatformTarget {
        format!("{}/{}", self.child_env[GOOS], self.child_env[GOARCH])
            .parse()
            .unwrap()
    }
}

#[derive(Debug, Default)]
struct StubState {
    invocations: Vec<Invocation>,
    reject_after_run: Vec<String>,
}

/// A toolchain that never spawns anything.
#[derive(Debug, Clone)]
pub struct StubToolchain {
    env: MemoryEnv,
    defaults: HashMap<String, String>,
    failures: HashMap<PlatformTarget, i32>,
    spawn_fails: bool,
    state: Rc<RefCell<StubState>>,
}

impl StubToolchain {
    pub fn new(env: MemoryEnv) -> Self {
        StubToolchain {
            env,
            defaults: HashMap::new(),
            failures: HashMap::new(),
            spawn_fails: false,
            state: Rc::new(RefCell::new(StubState::default())),
        }
    }

    /// Value reported for `key` when the environment does not set it.
    pub fn with_default(mut self, key: &str, value: &str) -> Self {
        self.defaults.insert(key.to_string(), value.to_string());
        self
    }

    /// Exit with `code` when building `target`.
    pub fn fail_on(mut self, target: PlatformTarget, code: i32) -> Self {
        self.failures.insert(target, code);
        self
    }

    /// Fail every run as if the program were missing.
    pub fn spawn_fails(mut self) -> Self {
        self.spawn_fails = true;
        self
    }

    /// After the next compiler run, make writes to `key` fail.
    pub fn reject_writes_after_run(&self, key: &str) {
        self.state
            .borrow_mut()
            .reject_after_run
            .push(key.to_string());
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.borrow().invocations.clone()
    }
}

impl Toolchain for StubToolchain {
    fn program(&self) -> &str {
        "go"
    }

    fn resolve_env(&self, key: &str) -> Option<String> {
        self.env
            .get(key)
            .or_else(|| self.defaults.get(key).cloned())
    }

    fn run(&self, command: &ProcessBuilder) -> io::Result<CompileStatus> {
        let child_env = TRACKED_VARS
            .iter()
            .filter_map(|key| {
                command
                    .get_env(key)
                    .map(|value| (key.to_string(), value.to_string()))
            })
            .collect();

        let invocation = Invocation {
            goos: self.env.get(GOOS),
            goarch: self.env.get(GOARCH),
            cgo_enabled: self.env.get(CGO_ENABLED),
            args: command.get_args().to_vec(),
            child_env,
        };
        let target = invocation.target();

        let mut state = self.state.borrow_mut();
        state.invocations.push(invocation);
        for key in state.reject_after_run.drain(..) {
            self.env.reject_writes_to(key);
        }

        if self.spawn_fails {
            return Err(io::Error::new(io::ErrorKind::NotFound, "program not found"));
        }

        let code = self.failures.get(&target).copied().unwrap_or(0);
        Ok(CompileStatus::from_code(code))
    }
}

/// Keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<BuildEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.borrow().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &BuildEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
