//! gobake CLI - cross-compile a Go project for a fixed platform matrix

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};
use gobake::util::Shell;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("gobake=debug")
    } else {
        EnvFilter::new("gobake=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == MessageFormat::Json,
    );

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, &shell),
        Commands::Env(args) => commands::env::execute(args, &shell),
        Commands::Targets => commands::targets::execute(&shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
