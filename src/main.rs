//! repocache - repository metadata cache builder
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use repocache::cli::args::{ConfigAction, ConfigArgs};
use repocache::cli::{Cli, Commands};
use repocache::config::{Config, ConfigManager};
use repocache::error::RepoCacheResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> RepoCacheResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    // init and path must work even when the existing file is broken
    let config = if matches!(
        cli.command,
        Commands::Config(ConfigArgs {
            action: Some(ConfigAction::Init { .. } | ConfigAction::Path)
        })
    ) {
        Config::default()
    } else {
        config_manager.load()?
    };

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Build(args) => repocache::cli::commands::build(args, &config),
        Commands::Status(args) => repocache::cli::commands::status(args, &config),
        Commands::Encode(args) => repocache::cli::commands::encode(args),
        Commands::Config(args) => {
            repocache::cli::commands::config(args, &config_manager, &config)
        }
    }
}

/// 0 = warn, 1 = info, 2+ = debug; `general.verbose` counts as one `-v`
fn init_logging(verbose: u8, config: &Config) {
    let level = verbose.max(u8::from(config.general.verbose));
    let filter = match level {
        0 => EnvFilter::new("repocache=warn"),
        1 => EnvFilter::new("repocache=info"),
        _ => EnvFilter::new("repocache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.json_logs() {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
