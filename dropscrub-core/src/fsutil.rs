//! Directory bootstrap helpers.
//!
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Ensures `dir` exists, creating it (and its parents) when absent.
///
/// Used at startup for every pipeline directory; the caller decides which
/// failures are fatal.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        debug!("Directory '{}' exists", dir.display());
        return Ok(());
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to auto create dir: {}", dir.display()))?;
    info!("Created dir: {}", dir.display());
    Ok(())
}
