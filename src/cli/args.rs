//! CLI argument definitions using clap
//!
//! Commands:
//! - leaderboot reconcile [--config <path>] [--work-dir <dir>]
//! - leaderboot show [--work-dir <dir>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// leaderboot - trust-bootstrap reconciliation for a cluster leader node
#[derive(Parser, Debug)]
#[command(name = "leaderboot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress structured log output
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile leader options and write the startup manifest
    Reconcile {
        /// Path to a YAML options file; omitted means all defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Working directory, overriding global.work-dir from the file
        #[arg(long)]
        work_dir: Option<String>,
    },

    /// Print the startup manifest of a previous run
    Show {
        /// Working directory the manifest was written under
        #[arg(long)]
        work_dir: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
