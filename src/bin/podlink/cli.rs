//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// podlink - wire generated dependency targets into IDE projects
#[derive(Parser)]
#[command(name = "podlink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format for messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    /// Path to Podlink.toml (searched upward from the current directory by default)
    #[arg(long, global = true, env = "PODLINK_MANIFEST")]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Integrate every target listed in Podlink.toml
    Integrate(IntegrateArgs),

    /// Report build settings that shadow the base configuration
    Check(CheckArgs),
}

#[derive(Args)]
pub struct IntegrateArgs {
    /// Only integrate the named targets (repeatable)
    #[arg(long, value_name = "NAME")]
    pub only: Vec<String>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Only check the named targets (repeatable)
    #[arg(long, value_name = "NAME")]
    pub only: Vec<String>,
}
