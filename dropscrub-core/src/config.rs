//! Configuration management for `dropscrub-core`.
//!
//! Defines the application configuration: the directory layout, the
//! content-category allow-lists, and the watch-loop tuning knobs. The
//! configuration is an explicit value handed to each component at
//! construction; there is no process-global state. YAML is the on-disk
//! format, with an embedded default used when no file is given.
//!
//! License: MIT OR Apache-2.0

use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory layout of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FilePathsConfig {
    /// Directory watched for newly-arrived files.
    pub monitor_dir: PathBuf,
    /// Holds the single current generation of timestamped archives.
    pub output_dir: PathBuf,
    /// Post-extraction staging; a file here is not yet redacted.
    pub staging_dir: PathBuf,
    /// Redacted output, one `PII_filtered_*` file per extracted entry.
    pub filtered_dir: PathBuf,
    /// Per-job secret key files, kept apart from the archives they open.
    pub keys_dir: PathBuf,
}

/// Content-category allow-lists, matched against sniffed categories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FilesConfig {
    pub plain_content_types: Vec<String>,
    pub archive_content_types: Vec<String>,
}

/// Watch-loop and worker tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchTuning {
    /// Poll interval of the directory scanner, in milliseconds.
    pub poll_interval_ms: u64,
    /// Capacity of the bounded channel between watcher and pipeline.
    pub queue_capacity: usize,
    /// Concurrent pipeline workers. One worker preserves arrival order.
    pub workers: usize,
    /// Deadline for a single pipeline job, in seconds.
    pub job_timeout_secs: u64,
}

impl Default for WatchTuning {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            queue_capacity: 64,
            workers: 1,
            job_timeout_secs: 30,
        }
    }
}

/// The top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    pub file_paths: FilePathsConfig,
    pub files: FilesConfig,
    #[serde(default)]
    pub watch: WatchTuning,
}

impl AppConfig {
    /// Loads the configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Loads the embedded default configuration.
    pub fn load_default() -> Result<Self> {
        debug!("Loading default configuration from embedded string...");
        let default_yaml = include_str!("../config/default_config.yaml");
        let config: AppConfig =
            serde_yml::from_str(default_yaml).context("Failed to parse default configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.files.plain_content_types.is_empty() && self.files.archive_content_types.is_empty()
        {
            bail!("Both content allow-lists are empty; no file could ever be processed");
        }
        if self.watch.workers == 0 {
            bail!("watch.workers must be at least 1");
        }
        if self.watch.queue_capacity == 0 {
            bail!("watch.queue_capacity must be at least 1");
        }
        if self.file_paths.monitor_dir == self.file_paths.output_dir {
            bail!("monitor_dir and output_dir must differ; archives would be re-detected");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        let config = AppConfig::load_default().unwrap();
        assert_eq!(config.file_paths.staging_dir, PathBuf::from("tmp"));
        assert_eq!(config.files.plain_content_types, vec!["text/plain"]);
        assert_eq!(config.watch.workers, 1);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let mut config = AppConfig::load_default().unwrap();
        config.watch.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn colliding_monitor_and_output_dirs_are_rejected() {
        let mut config = AppConfig::load_default().unwrap();
        config.file_paths.output_dir = config.file_paths.monitor_dir.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_allow_lists_are_rejected() {
        let mut config = AppConfig::load_default().unwrap();
        config.files.plain_content_types.clear();
        config.files.archive_content_types.clear();
        assert!(config.validate().is_err());
    }
}
