//! CLI command implementations
//!
//! Commands are thin: they load raw options, hand them to the reconciliation
//! driver, and print what it produced. All validation happens in the
//! reconcilers.

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::authentication::HttpBootstrapExchange;
use crate::observability::Logger;
use crate::options::{default_work_dir, RawOptions};
use crate::reconcile::{read_manifest, Driver, Reconciliation};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_response, write_text};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    Logger::set_quiet(cli.quiet);
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Reconcile { config, work_dir } => {
            reconcile(config.as_deref(), work_dir.as_deref())
        }
        Command::Show { work_dir } => show(work_dir.as_deref()),
    }
}

/// Load raw options from an optional file, then apply the `--work-dir`
/// override.
pub fn load_options(config: Option<&Path>, work_dir: Option<&str>) -> CliResult<RawOptions> {
    let mut raw = match config {
        Some(path) => RawOptions::load(path)?,
        None => RawOptions::default(),
    };
    if let Some(dir) = work_dir {
        raw.global.work_dir = dir.to_string();
    }
    Ok(raw)
}

/// Reconcile options and write the startup manifest
pub fn reconcile(config: Option<&Path>, work_dir: Option<&str>) -> CliResult<()> {
    let raw = load_options(config, work_dir)?;
    let exchange = HttpBootstrapExchange::default();
    let reconciliation = Driver::new(&raw, &exchange).run()?;
    write_response(summary(&reconciliation))
}

/// Print the manifest persisted under a working directory
pub fn show(work_dir: Option<&str>) -> CliResult<()> {
    let work_dir = work_dir
        .map(PathBuf::from)
        .unwrap_or_else(default_work_dir);
    let options = read_manifest(&work_dir)?;
    let yaml = options
        .to_yaml()
        .map_err(|e| CliError::io_error(format!("failed to render manifest: {}", e)))?;
    write_text(&yaml)
}

fn summary(reconciliation: &Reconciliation) -> serde_json::Value {
    let options = &reconciliation.options;
    json!({
        "run_id": reconciliation.run_id.to_string(),
        "manifest": reconciliation.manifest.display().to_string(),
        "kine": options.kine.as_ref().map(|k| k.provenance),
        "network_manager": options.network_manager.provenance,
        "network_manager_local": options.network_manager.is_local(),
    })
}
