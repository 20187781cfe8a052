// dropscrub/src/lib.rs
//! # Dropscrub CLI
//!
//! This crate provides the command-line front end for the dropscrub
//! pipeline: the long-running `watch` command wiring the polling watch
//! source into the ingest pipeline, and the one-shot `filter` command for
//! running the redaction engine over a single file.

pub mod cli;
pub mod commands;
pub mod logger;
