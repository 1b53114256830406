//! Implementation of `gobake build`.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::env::ProcessEnv;
use crate::builder::events::EventSink;
use crate::builder::orchestrator::Orchestrator;
use crate::builder::toolchain::{GoToolchain, Toolchain, CGO_ENABLED};
use crate::core::build_config::{BuildConfiguration, DEFAULT_COMPILER, DEFAULT_OUT_DIR};
use crate::core::platform::PlatformTarget;
use crate::util::config::Config;
use crate::util::process::find_executable;
use crate::util::GlobalContext;

/// Options for the build command. `None` falls back to configuration.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Build every supported platform
    pub all: bool,

    /// Explicit targets (empty = use configuration)
    pub targets: Vec<PlatformTarget>,

    /// Output directory
    pub out_dir: Option<PathBuf>,

    /// Artifact base name
    pub package: Option<String>,

    /// Compiler command
    pub compiler: Option<String>,

    /// Enable or disable cgo
    pub cgo: Option<bool>,
}

/// What a successful build produced.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub out_dir: PathBuf,
    pub artifacts: Vec<PathBuf>,
}

/// Combine command-line options, configuration and defaults.
///
/// `cgo_default` is consulted with the compiler command only when neither the
/// options nor the configuration decide cgo.
pub fn resolve_configuration(
    ctx: &GlobalContext,
    config: &Config,
    opts: &BuildOptions,
    cgo_default: impl FnOnce(&str) -> bool,
) -> Result<BuildConfiguration> {
    let package = match opts.package.clone().or_else(|| config.build.package.clone()) {
        Some(package) => package,
        None => ctx.default_package_name()?,
    };

    let compiler = opts
        .compiler
        .clone()
        .or_else(|| config.build.compiler.clone())
        .unwrap_or_else(|| DEFAULT_COMPILER.to_string());

    let out_dir = opts
        .out_dir
        .clone()
        .or_else(|| config.build.out_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));

    let cgo = match opts.cgo.or(config.build.cgo) {
        Some(cgo) => cgo,
        None => cgo_default(&compiler),
    };

    let mut build_config = BuildConfiguration::new(package)
        .with_output_directory(out_dir)
        .with_compiler(compiler)
        .with_cgo(cgo);

    if opts.all {
        build_config.build_all = true;
    } else if !opts.targets.is_empty() {
        build_config = build_config.with_targets(opts.targets.iter().copied());
    } else if config.build.all == Some(true) {
        build_config.build_all = true;
    } else if let Some(targets) = config.targets()? {
        build_config = build_config.with_targets(targets);
    }

    Ok(build_config)
}

/// Build the project in the current directory for every selected platform.
pub fn build(ctx: &GlobalContext, opts: &BuildOptions, sink: &dyn EventSink) -> Result<BuildSummary> {
    let config = ctx.load_config();
    let build_config = resolve_configuration(ctx, &config, opts, |compiler| {
        GoToolchain::new(compiler).resolve_env(CGO_ENABLED).as_deref() == Some("1")
    })?;

    tracing::debug!("build configuration: {:?}", build_config);

    if find_executable(&build_config.compiler_command).is_none() {
        tracing::warn!(
            "compiler `{}` was not found in PATH",
            build_config.compiler_command
        );
    }

    let toolchain = GoToolchain::new(build_config.compiler_command.clone());
    let out_dir = build_config.output_directory.clone();
    let orchestrator = Orchestrator::new(build_config, toolchain, ProcessEnv);

    let artifacts = orchestrator.build(sink)?.into_result()?;

    Ok(BuildSummary { out_dir, artifacts })
}
