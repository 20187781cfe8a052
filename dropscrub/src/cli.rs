// dropscrub/src/cli.rs
//! This file defines the command-line interface (CLI) for the dropscrub
//! application, including all available commands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "dropscrub",
    author = "Dropscrub Contributors",
    version = env!("CARGO_PKG_VERSION"),
    about = "Watch a drop directory, archive plaintext, redact PII from archives",
    long_about = "Dropscrub watches a directory for newly-arrived files. Plaintext files are packaged into password-protected, timestamped archives; password-protected archives are unpacked and their contents passed through a PII-redaction filter that rewrites phone numbers, email addresses, IP addresses, user home paths and JSON name fields with placeholder tokens.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Suppress all informational and debug messages.
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    /// Path to a YAML configuration file (embedded defaults otherwise).
    #[arg(long, value_name = "FILE", global = true, env = "DROPSCRUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to a YAML rules file merged over the built-in redaction rules.
    #[arg(long, value_name = "FILE", global = true)]
    pub rules: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `dropscrub` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the monitored directory and process arrivals until interrupted.
    #[command(about = "Watch the monitored directory and process arrivals until interrupted.")]
    Watch,

    /// Run the redaction engine over a single file, without the watch loop.
    #[command(about = "Run the redaction engine over a single file, without the watch loop.")]
    Filter(FilterCommand),
}

/// Arguments for the `filter` command.
#[derive(Parser, Debug)]
pub struct FilterCommand {
    /// The file to redact.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Write redacted output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}
