//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell as CompletionShell;

use gobake::util::shell::ColorChoice;

/// gobake - cross-compile a Go project for every supported platform
#[derive(Parser)]
#[command(name = "gobake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the project in the current directory for the selected platforms
    Build(BuildArgs),

    /// Show the compiler's current target environment
    Env(EnvArgs),

    /// List the supported platforms
    Targets,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build every supported platform
    #[arg(long)]
    pub all: bool,

    /// Platform to build, as `os/arch` or its number in `gobake targets`
    #[arg(short, long, value_name = "TARGET")]
    pub target: Vec<String>,

    /// Directory to write binaries to (default: ./build)
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Base name for binaries (default: current directory name)
    #[arg(short, long)]
    pub package: Option<String>,

    /// Compiler command (default: go)
    #[arg(long, env = "GOBAKE_COMPILER")]
    pub compiler: Option<String>,

    /// Build with cgo enabled
    #[arg(long, conflicts_with = "no_cgo")]
    pub cgo: bool,

    /// Build with cgo disabled
    #[arg(long)]
    pub no_cgo: bool,
}

#[derive(Args)]
pub struct EnvArgs {
    /// Compiler command (default: go)
    #[arg(long, env = "GOBAKE_COMPILER")]
    pub compiler: Option<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
