//! Trust-bootstrap reconciliation
//!
//! Each reconciler is a function from a raw options fragment (plus the
//! effective state of earlier phases) to an effective fragment and, where it
//! created any, the authentication handles for its subsystem. The
//! [`Driver`] composes them and persists the result.

mod apiserver;
mod driver;
mod errors;
mod global;
mod kine;
mod manifest;
mod network;

pub use apiserver::reconcile_apiserver;
pub use driver::{Driver, Reconciliation};
pub use errors::{ReconcileError, ReconcileErrorCode, ReconcileResult};
pub use global::{reconcile_global, GlobalOutcome};
pub use kine::{reconcile_kine, KineOutcome};
pub use manifest::{read_manifest, write_manifest};
pub use network::{reconcile_network_manager, MembershipAuthentication, NetworkOutcome};
