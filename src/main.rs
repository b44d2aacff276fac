//! Artcache - artifact resolution cache
//!
//! CLI entry point that dispatches to subcommands.

use artcache::cli::{commands, Cli, Commands};
use artcache::config::ConfigManager;
use artcache::error::ArtcacheResult;
use clap::Parser;
use console::style;
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

fn run() -> ArtcacheResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let mut config = config_manager.load()?;
    if let Some(dir) = cli.cache_dir {
        config.cache.dir = Some(dir);
    }

    init_logging(cli.verbose, config.general.json_logs());
    debug!("Loaded configuration from {}", config_manager.path().display());

    match cli.command {
        Commands::Store(args) => commands::store(args, &config),
        Commands::StoreMissing(args) => commands::store_missing(args, &config),
        Commands::Lookup(args) => commands::lookup(args, &config),
        Commands::Clear(args) => commands::clear(args, &config),
        Commands::List(args) => commands::list(args, &config),
        Commands::Config(args) => commands::config(args, &config, &config_manager),
    }
}

/// 0 = warn, 1 = info, 2+ = debug; logs go to stderr
fn init_logging(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => EnvFilter::new("artcache=warn"),
        1 => EnvFilter::new("artcache=info"),
        _ => EnvFilter::new("artcache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
