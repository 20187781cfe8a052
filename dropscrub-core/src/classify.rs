//! File classification.
//!
//! Decides which pipeline branch a detected file takes by sniffing its
//! content category and matching it against the configured allow-lists.
//! Files outside the monitored directory are never in scope, whatever
//! their content.
//!
//! License: MIT OR Apache-2.0

use std::path::{Path, PathBuf};

use log::trace;

use crate::config::FilesConfig;
use crate::errors::ScrubError;
use crate::sniff;

/// Outcome of classifying one detected file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationResult {
    /// Plaintext in scope for archiving.
    PlainContent,
    /// A password-protected archive in scope for extraction and redaction.
    ArchiveContent,
    /// Everything else; the event is logged and discarded.
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct FileClassifier {
    monitor_dir: PathBuf,
    plain_types: Vec<String>,
    archive_types: Vec<String>,
}

impl FileClassifier {
    pub fn new(monitor_dir: impl Into<PathBuf>, files: &FilesConfig) -> Self {
        Self {
            monitor_dir: monitor_dir.into(),
            plain_types: files.plain_content_types.clone(),
            archive_types: files.archive_content_types.clone(),
        }
    }

    /// Classifies the file at `path` by content.
    ///
    /// The path must exist at call time; a race with deletion surfaces as
    /// `ScrubError::SourceVanished` and is treated by the caller as
    /// "ignore this event". Classification is idempotent for an unchanged
    /// file.
    pub fn classify(&self, path: &Path) -> Result<ClassificationResult, ScrubError> {
        let category = sniff::sniff(path)?;
        trace!("{} sniffed as {}", path.display(), category);

        if !path.starts_with(&self.monitor_dir) {
            return Ok(ClassificationResult::Unsupported);
        }

        if self.plain_types.iter().any(|t| t == &category) {
            Ok(ClassificationResult::PlainContent)
        } else if self.archive_types.iter().any(|t| t == &category) {
            Ok(ClassificationResult::ArchiveContent)
        } else {
            Ok(ClassificationResult::Unsupported)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilesConfig;
    use std::fs;

    fn classifier(monitor_dir: &Path) -> FileClassifier {
        FileClassifier::new(
            monitor_dir,
            &FilesConfig {
                plain_content_types: vec!["text/plain".to_string()],
                archive_content_types: vec!["application/zip".to_string()],
            },
        )
    }

    #[test]
    fn text_under_monitor_dir_is_plain_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        fs::write(&path, "hello").unwrap();

        let classifier = classifier(dir.path());
        assert_eq!(
            classifier.classify(&path).unwrap(),
            ClassificationResult::PlainContent
        );
    }

    #[test]
    fn classification_is_idempotent_for_unchanged_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        fs::write(&path, "hello").unwrap();

        let classifier = classifier(dir.path());
        let first = classifier.classify(&path).unwrap();
        let second = classifier.classify(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn files_outside_monitor_dir_are_unsupported() {
        let monitor = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let path = elsewhere.path().join("note.txt");
        fs::write(&path, "hello").unwrap();

        let classifier = classifier(monitor.path());
        assert_eq!(
            classifier.classify(&path).unwrap(),
            ClassificationResult::Unsupported
        );
    }

    #[test]
    fn vanished_files_surface_as_source_vanished() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = classifier(dir.path());
        let err = classifier.classify(&dir.path().join("gone.txt")).unwrap_err();
        assert!(matches!(err, ScrubError::SourceVanished(_)));
    }
}
