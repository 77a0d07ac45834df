//! Global reconciler
//!
//! Normalizes the working directory, derives the log directory, and decides
//! whether the embedded storage backend must run: with no external storage
//! endpoint configured it always runs, whatever the operator asked for.

use std::path::PathBuf;

use crate::observability::{log_event_with_fields, Event};
use crate::options::{default_work_dir, EffectiveGlobal, RawApiServer, RawGlobal};

use super::errors::ReconcileResult;

/// Output of the global reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalOutcome {
    pub options: EffectiveGlobal,
    /// Root for self-managed certificate material: `<work-dir>/tls`
    pub cert_dir: PathBuf,
}

/// Reconcile process-wide options. Never fails.
pub fn reconcile_global(raw: &RawGlobal, apiserver: &RawApiServer) -> ReconcileResult<GlobalOutcome> {
    let work_dir = if raw.work_dir.trim().is_empty() {
        default_work_dir()
    } else {
        PathBuf::from(raw.work_dir.trim())
    };

    let log_dir = if raw.log_dir.trim().is_empty() {
        work_dir.join("logs")
    } else {
        PathBuf::from(raw.log_dir.trim())
    };

    let external_storage = !apiserver.etcd_servers.trim().is_empty();
    let run_kine = raw.run_kine || !external_storage;
    if run_kine && !raw.run_kine {
        log_event_with_fields(
            Event::KineForced,
            &[("reason", "no external storage endpoint configured")],
        );
    }

    let worker_config = if raw.enable_worker {
        raw.worker_config.clone()
    } else {
        String::new()
    };

    let options = EffectiveGlobal {
        work_dir,
        log_dir,
        log_to_dir: raw.log_to_dir,
        log_to_std: raw.log_to_std,
        run_kine,
        run_network_manager: raw.run_network_manager,
        enable_worker: raw.enable_worker,
        worker_config,
    };
    let cert_dir = options.tls_dir();

    Ok(GlobalOutcome { options, cert_dir })
}
