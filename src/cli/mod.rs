//! CLI module for leaderboot
//!
//! Provides command-line interface for:
//! - reconcile: Reconcile options and write the startup manifest
//! - show: Print a previously written manifest

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{load_options, reconcile, run, run_command, show};
pub use errors::{CliError, CliErrorCode, CliResult};
