//! `gobake build` command

use anyhow::{Context, Result};

use crate::cli::BuildArgs;
use gobake::core::PlatformTarget;
use gobake::ops::gobake_build::{build, BuildOptions};
use gobake::util::shell::Status;
use gobake::util::{GlobalContext, Shell};

pub fn execute(args: BuildArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let targets = args
        .target
        .iter()
        .map(|t| {
            t.parse::<PlatformTarget>()
                .with_context(|| format!("invalid target `{}`", t))
        })
        .collect::<Result<Vec<_>>>()?;

    // --cgo / --no-cgo override config; neither means "ask the toolchain"
    let cgo = match (args.cgo, args.no_cgo) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };

    let opts = BuildOptions {
        all: args.all,
        targets,
        out_dir: args.out_dir,
        package: args.package,
        compiler: args.compiler,
        cgo,
    };

    let summary = build(&ctx, &opts, shell)?;

    if !summary.artifacts.is_empty() {
        shell.status(
            Status::Finished,
            format!(
                "{} binaries in {}",
                summary.artifacts.len(),
                summary.out_dir.display()
            ),
        );
    }

    Ok(())
}
