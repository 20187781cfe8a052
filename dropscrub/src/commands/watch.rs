//! The long-running watch command.
//!
//! Wires the polling watch source into the ingest pipeline through a
//! bounded channel and runs until interrupted. Startup validation is the
//! only place allowed to refuse to run; once the loop is up, every
//! per-job failure is contained inside the pipeline.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use dropscrub_core::{
    AppConfig, IngestPipeline, PatternRedactor, PollWatcher, RuleSet, WatchSource,
};

pub async fn run(config: AppConfig, rules: RuleSet) -> Result<()> {
    let redactor = PatternRedactor::new(rules).context("Failed to build the redaction engine")?;
    let pipeline = Arc::new(IngestPipeline::new(config.clone(), redactor));

    // Fatal startup policy: unusable directories refuse to start.
    pipeline.bootstrap()?;

    let mut watcher = PollWatcher::new(
        Duration::from_millis(config.watch.poll_interval_ms),
        config.watch.queue_capacity,
    );
    let events = watcher
        .subscribe(&config.file_paths.monitor_dir, false)
        .context("Failed to start the watch source")?;

    info!(
        "Watching {} for new files",
        config.file_paths.monitor_dir.display()
    );
    let runner = tokio::spawn(Arc::clone(&pipeline).run(events));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown requested; stopping watch source");

    // Stopping the watcher drops the sender; the pipeline drains what is
    // already queued and returns.
    watcher.stop();
    runner.await.context("Pipeline loop failed to shut down")?;

    info!("Watch loop stopped");
    Ok(())
}
