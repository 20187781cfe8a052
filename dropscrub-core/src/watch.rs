//! File-arrival events and the watch source seam.
//!
//! The pipeline consumes a bounded stream of `FileEvent`s; where they come
//! from is a black box behind the `WatchSource` trait. The crate ships a
//! polling implementation so the binary runs end-to-end on any platform;
//! an inotify-backed source can be swapped in behind the same trait.
//!
//! License: MIT OR Apache-2.0

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use tokio::sync::mpsc::{self, Receiver, Sender};
use walkdir::WalkDir;

/// What happened to the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Created,
    Moved,
    Other,
}

/// One file-arrival event, produced by a watch source and consumed once
/// by the pipeline. Never persisted.
#[derive(Debug, Clone)]
pub struct FileEvent {
    pub kind: EventKind,
    pub path: PathBuf,
    pub is_directory: bool,
}

impl FileEvent {
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: EventKind::Created,
            path: path.into(),
            is_directory: false,
        }
    }

    /// Only created/moved file events enter the pipeline; directory
    /// events and everything else are filtered at the door.
    pub fn is_actionable(&self) -> bool {
        !self.is_directory && matches!(self.kind, EventKind::Created | EventKind::Moved)
    }
}

/// A producer of file-arrival events for one directory.
pub trait WatchSource: Send {
    /// Starts watching `directory` and returns the bounded event stream.
    fn subscribe(&mut self, directory: &Path, recursive: bool) -> Result<Receiver<FileEvent>>;

    /// Stops the source, draining in-flight work. After `stop` returns,
    /// the stream's sender is dropped and the receiver will run dry.
    fn stop(&mut self);
}

/// Polling watch source.
///
/// Scans the directory on an interval and reports a file once its mtime
/// has settled across two consecutive scans, so half-copied files are not
/// handed to the pipeline. Files present before the first scan are never
/// reported.
pub struct PollWatcher {
    interval: Duration,
    capacity: usize,
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PollWatcher {
    pub fn new(interval: Duration, capacity: usize) -> Self {
        Self {
            interval,
            capacity: capacity.max(1),
            shutdown: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl WatchSource for PollWatcher {
    fn subscribe(&mut self, directory: &Path, recursive: bool) -> Result<Receiver<FileEvent>> {
        if self.handle.is_some() {
            bail!("PollWatcher is already subscribed");
        }

        let (tx, rx) = mpsc::channel(self.capacity);
        let dir = directory.to_path_buf();
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name("dropscrub-watch".to_string())
            .spawn(move || scan_loop(&dir, recursive, interval, &shutdown, &tx))
            .context("Failed to spawn watch thread")?;
        self.handle = Some(handle);

        Ok(rx)
    }

    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PollWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn scan_loop(
    dir: &Path,
    recursive: bool,
    interval: Duration,
    shutdown: &AtomicBool,
    tx: &Sender<FileEvent>,
) {
    // Files already present at startup form the baseline and are not
    // reported as arrivals.
    let mut seen = snapshot(dir, recursive);
    let mut pending: HashMap<PathBuf, SystemTime> = HashMap::new();

    while !shutdown.load(Ordering::Relaxed) {
        thread::sleep(interval);

        let current = snapshot(dir, recursive);

        for (path, modified) in &current {
            if let Some(known) = seen.get(path) {
                if known != modified {
                    // Rewritten in place; let it settle again.
                    seen.remove(path);
                    pending.insert(path.clone(), *modified);
                }
                continue;
            }

            match pending.get(path) {
                Some(last) if last == modified => {
                    pending.remove(path);
                    seen.insert(path.clone(), *modified);
                    debug!("Arrival settled: {}", path.display());
                    if tx.blocking_send(FileEvent::created(path)).is_err() {
                        return;
                    }
                }
                _ => {
                    pending.insert(path.clone(), *modified);
                }
            }
        }

        seen.retain(|path, _| current.contains_key(path));
        pending.retain(|path, _| current.contains_key(path));
    }
}

fn snapshot(dir: &Path, recursive: bool) -> HashMap<PathBuf, SystemTime> {
    let mut walker = WalkDir::new(dir).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut current = HashMap::new();
    for entry in walker.into_iter() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Watch scan error under {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let modified = entry
            .metadata()
            .ok()
            .and_then(|meta| meta.modified().ok())
            .unwrap_or(UNIX_EPOCH);
        current.insert(entry.into_path(), modified);
    }
    current
}
