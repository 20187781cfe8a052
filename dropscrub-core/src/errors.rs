//! errors.rs - Custom error types for the dropscrub-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//! Archive decode failures carry their own kind enum so the pipeline can
//! choose a per-failure policy instead of letting them propagate uncaught.
//!
//! License: MIT OR Apache-2.0

use std::path::PathBuf;

use thiserror::Error;

/// This enum represents all possible error types in the `dropscrub-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScrubError {
    #[error("Failed to compile redaction rule '{0}': {1}")]
    RuleCompilation(String, regex::Error),

    #[error("Rule '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    /// The detected file was removed between detection and inspection.
    /// Callers treat this as "ignore the event", not as a hard failure.
    #[error("Detected file vanished before inspection: {}", .0.display())]
    SourceVanished(PathBuf),

    #[error("Failed to create archive {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeFailure),

    #[error("Secret store failure for job '{stem}': {source}")]
    SecretStore {
        stem: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Extracted file is not valid UTF-8 text: {}", .0.display())]
    NonUtf8Payload(PathBuf),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}

/// Failure kinds surfaced by the decode half of the archive codec.
///
/// Wrong passwords and corrupt containers are distinct from staging I/O so
/// the orchestrator can log them differently; all of them are contained
/// per-job at the pipeline boundary.
#[derive(Error, Debug)]
pub enum DecodeFailure {
    #[error("password rejected for archive {}", .0.display())]
    WrongPassword(PathBuf),

    #[error("archive {} is corrupt or unreadable: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("archive {} contains an unsafe entry name '{entry}'", .path.display())]
    UnsafeEntry { path: PathBuf, entry: String },

    #[error("archive {} has no usable file name to derive a password from", .0.display())]
    BadName(PathBuf),

    #[error("failed to stage extracted entry from {}: {source}", .path.display())]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
