// dropscrub-core/src/lib.rs
//! # Dropscrub Core Library
//!
//! `dropscrub-core` implements the file-classification and redaction
//! pipeline behind the `dropscrub` watcher: event-driven dispatch that
//! decides what to do with a detected file, a password-protected archive
//! codec whose per-job secrets live in a separate key store, and a
//! PII-redaction engine that replaces phone numbers, email addresses,
//! IPv4 addresses, user home paths and JSON `"name"` fields with stable
//! placeholder tokens.
//!
//! ## Modules
//!
//! * `config`: application configuration (directory layout, allow-lists, tuning).
//! * `rules`: token-substitution rules, loading and merging.
//! * `compiler`: compilation and caching of rule regexes.
//! * `redactor`: the `PatternRedactor` text transform.
//! * `paths`: the Windows/Linux user-path rewrite passes.
//! * `sniff`: content-category sniffing capability.
//! * `classify`: allow-list classification of detected files.
//! * `secrets`: per-job archive secrets with legacy fallback.
//! * `archive`: the encrypted single-entry archive codec.
//! * `watch`: file-arrival events, the `WatchSource` seam, polling source.
//! * `pipeline`: the ingest orchestrator and its worker loop.
//! * `fsutil`: directory bootstrap helpers.
//! * `errors`: the library error types.
//!
//! The engine is pure and stateless; the pipeline owns all staging-state
//! lifecycle. Per-job failures never escape the pipeline: they are logged
//! and the loop continues with the next event.
//!
//! License: MIT OR Apache-2.0

pub mod archive;
pub mod classify;
pub mod compiler;
pub mod config;
pub mod errors;
pub mod fsutil;
pub mod paths;
pub mod pipeline;
pub mod redactor;
pub mod rules;
pub mod secrets;
pub mod sniff;
pub mod watch;

/// Re-exports the application configuration types.
pub use config::{AppConfig, FilePathsConfig, FilesConfig, WatchTuning};

/// Re-exports the custom error types for clear error reporting.
pub use errors::{DecodeFailure, ScrubError};

/// Re-exports the rule model and loader.
pub use rules::{merge_rules, RedactionRule, RuleSet, MAX_PATTERN_LENGTH};

/// Re-exports the compiled-rule types for advanced usage.
pub use compiler::{compile_rules, CompiledRule, CompiledRules};

/// Re-exports the redaction engine.
pub use redactor::PatternRedactor;

/// Re-exports classification types.
pub use classify::{ClassificationResult, FileClassifier};

/// Re-exports the archive codec and the secret store backing it.
pub use archive::{ArchiveCodec, Extraction, ARCHIVE_STAMP_FORMAT};
pub use secrets::SecretStore;

/// Re-exports the pipeline orchestrator.
pub use pipeline::{IngestPipeline, JobOutcome, FILTERED_PREFIX};

/// Re-exports the watch-source interface and the polling implementation.
pub use watch::{EventKind, FileEvent, PollWatcher, WatchSource};
