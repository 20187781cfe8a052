//! The ingest pipeline.
//!
//! Consumes file-arrival events and drives each file through
//! classification, then either the archive branch (plaintext packaged
//! into a password-protected archive) or the redaction branch (archive
//! extracted, every entry redacted and persisted). The pipeline
//! exclusively owns the staging lifecycle: create in staging, consume,
//! delete.
//!
//! Every per-job failure is contained here: classification races, encode
//! failures, decode failures of any kind, and unreadable payloads are
//! logged and dropped, and the loop moves on to the next event. Only
//! startup validation is allowed to refuse to run.
//!
//! License: MIT OR Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use tokio::sync::mpsc::Receiver;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::archive::ArchiveCodec;
use crate::classify::{ClassificationResult, FileClassifier};
use crate::config::AppConfig;
use crate::errors::ScrubError;
use crate::fsutil::ensure_dir;
use crate::redactor::PatternRedactor;
use crate::secrets::SecretStore;
use crate::watch::FileEvent;

/// Prefix of every redacted output file name.
pub const FILTERED_PREFIX: &str = "PII_filtered_";

/// Terminal state of one processed event.
#[derive(Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// Plaintext branch completed; the archive now sits in the output dir.
    Archived(PathBuf),
    /// Archive branch completed; `produced` redacted files were written.
    Redacted { produced: usize },
    /// Event filtered out, unsupported, or failed-and-logged.
    Ignored,
}

pub struct IngestPipeline {
    config: AppConfig,
    classifier: FileClassifier,
    codec: ArchiveCodec,
    redactor: PatternRedactor,
    /// Serializes purge-then-write on the output directory so concurrent
    /// encodes cannot delete each other's freshly written archive.
    output_lock: Mutex<()>,
}

impl IngestPipeline {
    pub fn new(config: AppConfig, redactor: PatternRedactor) -> Self {
        let classifier = FileClassifier::new(&config.file_paths.monitor_dir, &config.files);
        let codec = ArchiveCodec::new(SecretStore::new(&config.file_paths.keys_dir));
        Self {
            config,
            classifier,
            codec,
            redactor,
            output_lock: Mutex::new(()),
        }
    }

    /// Startup validation: every pipeline directory must exist or be
    /// creatable. A monitored or output directory that cannot be
    /// prepared is fatal; the process refuses to start.
    pub fn bootstrap(&self) -> Result<()> {
        info!("Running validation");
        let paths = &self.config.file_paths;
        ensure_dir(&paths.monitor_dir).context("monitored directory failed validation")?;
        ensure_dir(&paths.output_dir).context("output directory failed validation")?;
        ensure_dir(&paths.staging_dir).context("staging directory failed validation")?;
        ensure_dir(&paths.filtered_dir).context("filtered directory failed validation")?;
        ensure_dir(&paths.keys_dir).context("keys directory failed validation")?;
        Ok(())
    }

    /// Processes one event to its terminal state. Synchronous and
    /// blocking; the async loop wraps it in a worker task.
    pub fn handle_event(&self, event: &FileEvent) -> JobOutcome {
        if !event.is_actionable() {
            return JobOutcome::Ignored;
        }

        debug!("Event: {:?} - {}", event.kind, event.path.display());
        info!("File detected - {}", event.path.display());

        match self.classifier.classify(&event.path) {
            Ok(ClassificationResult::PlainContent) => {
                info!("Content verified: plain text");
                self.archive_plain(&event.path)
            }
            Ok(ClassificationResult::ArchiveContent) => {
                info!("Content verified: archive");
                self.unpack_and_redact(&event.path)
            }
            Ok(ClassificationResult::Unsupported) => {
                warn!("Detected file not in scope for processing: {}", event.path.display());
                JobOutcome::Ignored
            }
            Err(ScrubError::SourceVanished(path)) => {
                warn!("File has been removed during processing: {}", path.display());
                JobOutcome::Ignored
            }
            Err(err) => {
                error!("Classification failed for {}: {}", event.path.display(), err);
                JobOutcome::Ignored
            }
        }
    }

    /// Plaintext branch: purge the previous archive generation, then
    /// encode. The source file is left in place; only the archived copy
    /// matters. Encode failures are logged and dropped.
    fn archive_plain(&self, source: &Path) -> JobOutcome {
        let _guard = self.output_lock.lock().unwrap_or_else(|e| e.into_inner());

        if let Err(err) = self.prep_output_dir() {
            error!("Unable to prepare output directory: {}", err);
            return JobOutcome::Ignored;
        }

        match self.codec.encode(source, &self.config.file_paths.output_dir) {
            Ok(dest) => JobOutcome::Archived(dest),
            Err(err) => {
                error!("Unable to create archive for {}: {}", source.display(), err);
                JobOutcome::Ignored
            }
        }
    }

    /// Single-generation retention: any archive from a previous encode is
    /// deleted before the new one is written. Deletion failures are
    /// non-fatal; the encode proceeds.
    fn prep_output_dir(&self) -> Result<(), ScrubError> {
        let output_dir = &self.config.file_paths.output_dir;
        info!("Preparing output directory");

        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
            return Ok(());
        }

        for entry in fs::read_dir(output_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "zip") {
                debug!("Deleting {} from output directory", path.display());
                if let Err(err) = fs::remove_file(&path) {
                    warn!("Unable to delete {}: {}", path.display(), err);
                }
            }
        }
        Ok(())
    }

    /// Archive branch: decode into a job-scoped staging subdirectory,
    /// redact every extracted file into the filtered directory, then
    /// clean the staging state. Decode failures of every kind are
    /// contained here rather than allowed to take down the watch loop.
    fn unpack_and_redact(&self, archive: &Path) -> JobOutcome {
        let extraction = match self
            .codec
            .decode(archive, &self.config.file_paths.staging_dir)
        {
            Ok(extraction) => extraction,
            Err(failure) => {
                error!("Failed to decode {}: {}", archive.display(), failure);
                return JobOutcome::Ignored;
            }
        };

        let mut produced = 0usize;
        for file in &extraction.files {
            match self.redact_file(file) {
                Ok(()) => produced += 1,
                Err(err) => warn!("Skipping extracted file {}: {}", file.display(), err),
            }
        }

        // The job directory disappears with its last redacted file; a
        // leftover means some entry was skipped and kept for inspection.
        match fs::remove_dir(&extraction.job_dir) {
            Ok(()) => debug!("Cleaned staging dir {}", extraction.job_dir.display()),
            Err(err) => warn!(
                "Staging dir {} not removed: {}",
                extraction.job_dir.display(),
                err
            ),
        }

        JobOutcome::Redacted { produced }
    }

    /// Redacts one staged file into the filtered directory and deletes
    /// the staged copy. A staged file that is not UTF-8 text is skipped.
    fn redact_file(&self, file: &Path) -> Result<(), ScrubError> {
        info!("Running PII filtering on: {}", file.display());

        let raw = fs::read(file)?;
        let text = String::from_utf8(raw)
            .map_err(|_| ScrubError::NonUtf8Payload(file.to_path_buf()))?;
        let filtered = self.redactor.redact(&text);

        let name = file
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ScrubError::NonUtf8Payload(file.to_path_buf()))?;
        let dest = self
            .config
            .file_paths
            .filtered_dir
            .join(format!("{FILTERED_PREFIX}{name}"));

        info!("Creating PII filtered file: {}", dest.display());
        fs::write(&dest, filtered)?;
        fs::remove_file(file)?;
        Ok(())
    }

    /// The event loop: receives arrivals from the bounded channel and
    /// dispatches them to a semaphore-capped pool of blocking workers,
    /// each under the configured per-job deadline. Returns once the
    /// channel runs dry and all in-flight jobs finished.
    pub async fn run(self: Arc<Self>, mut events: Receiver<FileEvent>) {
        let workers = self.config.watch.workers.max(1);
        let deadline = Duration::from_secs(self.config.watch.job_timeout_secs.max(1));
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut inflight: JoinSet<()> = JoinSet::new();

        while let Some(event) = events.recv().await {
            if !event.is_actionable() {
                continue;
            }

            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let pipeline = Arc::clone(&self);

            inflight.spawn(async move {
                let _permit = permit;
                let path = event.path.clone();
                let job = tokio::task::spawn_blocking(move || pipeline.handle_event(&event));
                match tokio::time::timeout(deadline, job).await {
                    Ok(Ok(_outcome)) => {}
                    Ok(Err(join_err)) => {
                        error!("Pipeline worker failed for {}: {}", path.display(), join_err);
                    }
                    Err(_) => {
                        error!(
                            "Pipeline job for {} exceeded its {}s deadline; abandoning it",
                            path.display(),
                            deadline.as_secs()
                        );
                    }
                }
            });

            // Reap finished workers without blocking the loop.
            while inflight.try_join_next().is_some() {}
        }

        debug!("Event stream closed; draining in-flight jobs");
        while inflight.join_next().await.is_some() {}
    }
}
