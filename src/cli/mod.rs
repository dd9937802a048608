//! CLI module
//!
//! Command-line interface for running the target.
//!
//! A Singer target is a filter: protocol messages in on stdin, state
//! checkpoints out on stdout. The CLI only selects the configuration and,
//! for local runs, an optional input file.

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;
