//! CLI argument definitions using clap derive

use crate::schema::SchemaKind;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// repocache - versioned SQLite caches for repository metadata
///
/// Builds primary, filelists and other caches from JSON Lines package
/// records and rebuilds them only when their source or schema changes.
#[derive(Parser, Debug)]
#[command(name = "repocache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "REPOCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build or refresh a cache from package records
    Build(BuildArgs),

    /// Show whether a cache is fresh for its input
    Status(StatusArgs),

    /// Print the directory-grouped file lists of package records
    Encode(EncodeArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Cache selection shared by build and status
#[derive(clap::Args, Debug, Clone)]
pub struct TargetArgs {
    /// Cache kind
    #[arg(short, long, value_enum)]
    pub kind: SchemaKind,

    /// JSON Lines file with one package record per line
    #[arg(short, long)]
    pub input: PathBuf,

    /// Cache file prefix; `.sqlite` is appended (default: <cache dir>/<kind>)
    #[arg(short, long)]
    pub prefix: Option<PathBuf>,
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Keep stored packages that are missing from the input
    #[arg(long)]
    pub no_prune: bool,

    /// Delete the cache file and build from scratch
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the encode command
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// JSON Lines file with one package record per line
    pub input: PathBuf,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for the status command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Bare state name
    Plain,
}
