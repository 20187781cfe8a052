//! Command implementations for the dropscrub CLI.

pub mod filter;
pub mod watch;
