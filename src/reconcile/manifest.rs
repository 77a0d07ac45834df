//! Startup manifest persistence
//!
//! The manifest is the effective configuration of a successful run, written
//! as YAML to `<work-dir>/startup/leader.yaml`. Readers never observe a
//! partially written file: content goes to a sibling temp file, is fsynced,
//! then renamed over the target.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::options::EffectiveOptions;

use super::errors::{ReconcileError, ReconcileResult};

const TEMP_SUFFIX: &str = "tmp";

/// Persist `options` as the startup manifest. Returns the manifest path.
pub fn write_manifest(options: &EffectiveOptions) -> ReconcileResult<PathBuf> {
    let path = options.global.manifest_path();
    let dir = options.global.startup_dir();

    fs::create_dir_all(&dir).map_err(|e| {
        ReconcileError::manifest_failed(format!(
            "failed to create startup directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    let yaml = options.to_yaml().map_err(|e| {
        ReconcileError::manifest_failed(format!("failed to serialize manifest: {}", e))
    })?;

    let temp = path.with_extension(TEMP_SUFFIX);
    write_synced(&temp, yaml.as_bytes())?;
    fs::rename(&temp, &path).map_err(|e| {
        ReconcileError::manifest_failed(format!(
            "failed to move manifest into place at {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(path)
}

/// Read the manifest persisted under `work_dir`.
pub fn read_manifest(work_dir: &Path) -> ReconcileResult<EffectiveOptions> {
    let path = crate::options::manifest_path(work_dir);
    let content = fs::read_to_string(&path).map_err(|e| {
        ReconcileError::manifest_failed(format!(
            "failed to read manifest {}: {}",
            path.display(),
            e
        ))
    })?;
    EffectiveOptions::from_yaml(&content).map_err(|e| {
        ReconcileError::manifest_failed(format!(
            "failed to parse manifest {}: {}",
            path.display(),
            e
        ))
    })
}

fn write_synced(path: &Path, bytes: &[u8]) -> ReconcileResult<()> {
    let mut file = File::create(path).map_err(|e| {
        ReconcileError::manifest_failed(format!("failed to create {}: {}", path.display(), e))
    })?;
    file.write_all(bytes).map_err(|e| {
        ReconcileError::manifest_failed(format!("failed to write {}: {}", path.display(), e))
    })?;
    file.sync_all().map_err(|e| {
        ReconcileError::manifest_failed(format!("failed to fsync {}: {}", path.display(), e))
    })
}
