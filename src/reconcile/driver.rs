//! Reconciliation driver
//!
//! Runs the reconcilers in dependency order, stops at the first failure, and
//! persists the effective configuration only after every phase succeeded:
//!
//! 1. global
//! 2. storage backend (kine)
//! 3. network membership
//! 4. API front end
//! 5. manifest

use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

use crate::authentication::{AuthenticationStore, BootstrapExchange};
use crate::observability::{log_event_with_fields, Event};
use crate::options::{EffectiveOptions, RawOptions};

use super::apiserver::reconcile_apiserver;
use super::errors::ReconcileResult;
use super::global::reconcile_global;
use super::kine::reconcile_kine;
use super::manifest::write_manifest;
use super::network::{reconcile_network_manager, MembershipAuthentication};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub run_id: Uuid,
    pub options: EffectiveOptions,
    pub authentication: AuthenticationStore,
    /// Where the manifest was written
    pub manifest: PathBuf,
}

/// One reconciliation run over a set of raw options.
pub struct Driver<'a> {
    raw: &'a RawOptions,
    exchange: &'a dyn BootstrapExchange,
    run_id: Uuid,
}

impl<'a> Driver<'a> {
    pub fn new(raw: &'a RawOptions, exchange: &'a dyn BootstrapExchange) -> Self {
        Self {
            raw,
            exchange,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Run every phase. On error nothing is persisted except certificate
    /// material, which later runs reuse.
    pub fn run(&self) -> ReconcileResult<Reconciliation> {
        let run_id = self.run_id.to_string();
        let started = Utc::now();
        log_event_with_fields(Event::ReconcileStart, &[("run_id", run_id.as_str())]);

        match self.phases() {
            Ok(reconciliation) => {
                let elapsed = (Utc::now() - started).num_milliseconds().to_string();
                let manifest = reconciliation.manifest.display().to_string();
                log_event_with_fields(
                    Event::ReconcileComplete,
                    &[
                        ("run_id", run_id.as_str()),
                        ("manifest", manifest.as_str()),
                        ("duration_ms", elapsed.as_str()),
                    ],
                );
                Ok(reconciliation)
            }
            Err(e) => {
                log_event_with_fields(
                    Event::ReconcileFailed,
                    &[
                        ("run_id", run_id.as_str()),
                        ("code", e.code_str()),
                        ("error", e.message()),
                    ],
                );
                Err(e)
            }
        }
    }

    fn phases(&self) -> ReconcileResult<Reconciliation> {
        let global = reconcile_global(&self.raw.global, &self.raw.apiserver)?;
        let mut authentication = AuthenticationStore::new(&global.cert_dir);

        let kine = reconcile_kine(&self.raw.kine, &global.options)?;
        let kine_options = kine.map(|outcome| {
            authentication.kine = Some(outcome.material);
            outcome.options
        });

        let network =
            reconcile_network_manager(&self.raw.network_manager, &global.options, self.exchange)?;
        match network.authentication {
            MembershipAuthentication::Hosted(material) => {
                authentication.network_manager = Some(material);
            }
            MembershipAuthentication::Bootstrapped(client) => {
                authentication.network_manager_client = Some(client);
            }
            MembershipAuthentication::OperatorSupplied => {}
        }

        let apiserver = reconcile_apiserver(&self.raw.apiserver)?;

        let options = EffectiveOptions {
            global: global.options,
            kine: kine_options,
            network_manager: network.options,
            apiserver,
        };
        let manifest = write_manifest(&options)?;
        let shown = manifest.display().to_string();
        log_event_with_fields(Event::ManifestWritten, &[("path", shown.as_str())]);

        Ok(Reconciliation {
            run_id: self.run_id,
            options,
            authentication,
            manifest,
        })
    }
}
