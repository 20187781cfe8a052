// dropscrub/src/main.rs
//! Dropscrub entry point.
//!
//! Loads configuration and rules, initializes logging, and dispatches to
//! the selected command.

use anyhow::{Context, Result};
use clap::Parser;

use dropscrub::cli::{Cli, Commands};
use dropscrub::{commands, logger};
use dropscrub_core::{merge_rules, AppConfig, RuleSet};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let level = if args.quiet {
        log::LevelFilter::Off
    } else if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    logger::init_logger(Some(level));

    let config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_default()?,
    };

    let mut rules = RuleSet::load_default_rules()?;
    if let Some(path) = &args.rules {
        let user = RuleSet::load_from_file(path)
            .with_context(|| format!("Failed to load rules from {}", path.display()))?;
        rules = merge_rules(rules, Some(user));
    }

    match args.command {
        Commands::Watch => commands::watch::run(config, rules).await,
        Commands::Filter(filter) => {
            commands::filter::run(rules, &filter.input, filter.output.as_deref())
        }
    }
}
