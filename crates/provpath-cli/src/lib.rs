//! provpath CLI library.
//!
//! Command handlers, output formatting and terminal styling for the
//! `provpath-cli` binary.

pub mod commands;
pub mod output;
pub mod terminal;
