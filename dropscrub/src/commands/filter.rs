//! One-shot redaction of a single file.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use dropscrub_core::{PatternRedactor, RuleSet};

pub fn run(rules: RuleSet, input: &Path, output: Option<&Path>) -> Result<()> {
    let redactor = PatternRedactor::new(rules).context("Failed to build the redaction engine")?;

    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file {}", input.display()))?;
    let filtered = redactor.redact(&text);

    match output {
        Some(path) => {
            fs::write(path, filtered)
                .with_context(|| format!("Failed to write output file {}", path.display()))?;
            info!("Wrote redacted output to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            writeln!(writer, "{}", filtered)?;
        }
    }
    Ok(())
}
