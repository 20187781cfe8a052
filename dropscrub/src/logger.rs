//! Logger bootstrap for the CLI.
//!
//! All pipeline outcomes are surfaced through structured log lines, so
//! the logger is initialized before anything else runs. `RUST_LOG` is
//! honored; the explicit level from the CLI flags wins when given.

use env_logger::Builder;
use log::LevelFilter;

pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_default_env();
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_timestamp_secs();
    // Repeated initialization in tests is harmless.
    let _ = builder.try_init();
}
