use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const WORK_DIR_NAME: &str = ".leaderboot";
const FALLBACK_WORK_DIR: &str = "/var/lib/leaderboot";

/// Default working directory: `$HOME/.leaderboot`, or a system path when no
/// home directory is known.
pub fn default_work_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(WORK_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_WORK_DIR))
}

/// Operator-supplied process-wide options.
///
/// Fields absent from the options file take the values of [`Default`]: the
/// leader runs its own storage backend and membership service and logs to
/// standard output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawGlobal {
    pub work_dir: String,
    pub log_dir: String,
    pub log_to_dir: bool,
    pub log_to_std: bool,
    pub run_kine: bool,
    pub run_network_manager: bool,
    pub enable_worker: bool,
    pub worker_config: String,
}

impl Default for RawGlobal {
    fn default() -> Self {
        Self {
            work_dir: String::new(),
            log_dir: String::new(),
            log_to_dir: false,
            log_to_std: true,
            run_kine: true,
            run_network_manager: true,
            enable_worker: false,
            worker_config: String::new(),
        }
    }
}

/// Reconciled process-wide options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EffectiveGlobal {
    pub work_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_to_dir: bool,
    pub log_to_std: bool,
    pub run_kine: bool,
    pub run_network_manager: bool,
    pub enable_worker: bool,
    pub worker_config: String,
}

impl EffectiveGlobal {
    /// Root of all self-managed certificate material.
    pub fn tls_dir(&self) -> PathBuf {
        tls_dir(&self.work_dir)
    }

    /// Directory holding the startup manifest.
    pub fn startup_dir(&self) -> PathBuf {
        startup_dir(&self.work_dir)
    }

    /// Path of the startup manifest.
    pub fn manifest_path(&self) -> PathBuf {
        manifest_path(&self.work_dir)
    }
}

pub(crate) fn tls_dir(work_dir: &Path) -> PathBuf {
    work_dir.join("tls")
}

pub(crate) fn startup_dir(work_dir: &Path) -> PathBuf {
    work_dir.join("startup")
}

pub(crate) fn manifest_path(work_dir: &Path) -> PathBuf {
    startup_dir(work_dir).join("leader.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_work_dir_is_absolute() {
        assert!(default_work_dir().is_absolute());
    }

    #[test]
    fn test_derived_paths() {
        let global = EffectiveGlobal {
            work_dir: PathBuf::from("/tmp/x"),
            log_dir: PathBuf::from("/tmp/x/logs"),
            log_to_dir: false,
            log_to_std: true,
            run_kine: true,
            run_network_manager: false,
            enable_worker: false,
            worker_config: String::new(),
        };
        assert_eq!(global.tls_dir(), PathBuf::from("/tmp/x/tls"));
        assert_eq!(global.manifest_path(), PathBuf::from("/tmp/x/startup/leader.yaml"));
    }

    #[test]
    fn test_raw_defaults_host_everything() {
        let raw: RawGlobal = serde_yaml::from_str("log-to-dir: true").unwrap();
        assert!(raw.run_kine);
        assert!(raw.run_network_manager);
        assert!(raw.log_to_std);
        assert!(raw.log_to_dir);
        assert_eq!(raw.work_dir, "");
    }
}
