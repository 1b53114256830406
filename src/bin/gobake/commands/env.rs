//! `gobake env` command

use anyhow::Result;

use crate::cli::EnvArgs;
use gobake::builder::GoToolchain;
use gobake::core::build_config::DEFAULT_COMPILER;
use gobake::ops::gobake_env::{current_environment, ValueSource};
use gobake::util::{GlobalContext, Shell};

pub fn execute(args: EnvArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = ctx.load_config();

    let compiler = args
        .compiler
        .or(config.build.compiler)
        .unwrap_or_else(|| DEFAULT_COMPILER.to_string());

    let report = current_environment(&GoToolchain::new(compiler));

    if shell.is_json() {
        shell.json_event(&serde_json::to_value(&report)?);
        return Ok(());
    }

    for var in &report.vars {
        match var.source {
            ValueSource::Toolchain => println!("{}={}", var.name, var.value),
            ValueSource::HostDefault => println!("{}={}  (host default)", var.name, var.value),
        }
    }

    match &report.compiler_path {
        Some(path) => shell.note(format!("compiler: {}", path.display())),
        None => shell.warn(format!("compiler `{}` was not found in PATH", report.compiler)),
    }

    Ok(())
}
