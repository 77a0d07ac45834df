//! Authentication material for one reconciliation run
//!
//! Each reconciler that creates material returns it as a value; the driver
//! collects those values into an [`AuthenticationStore`]. Files stay on disk
//! after the run so subsystem servers can load them.

mod bootstrap;
mod kine;
mod material;
mod network;

use std::path::PathBuf;

use crate::certificate::{fingerprint, AuthoritySet};
use crate::observability::{log_event_with_fields, Event};

pub use bootstrap::{
    BootstrapBundle, BootstrapExchange, BootstrapRequest, HttpBootstrapExchange,
    MembershipClient, PemBundle,
};
pub use kine::KineAuthentication;
pub use material::{AuthenticationMaterial, Provenance};
pub use network::{EndpointMaterial, NetworkAuthentication, NetworkServerMaterial};

/// Every authentication handle derived during a run.
#[derive(Debug, Clone)]
pub struct AuthenticationStore {
    /// Root of self-managed material: `<work-dir>/tls`
    pub cert_dir: PathBuf,
    /// Storage backend server material, when the backend runs
    pub kine: Option<AuthenticationMaterial>,
    /// Embedded membership server material, when hosted here
    pub network_manager: Option<NetworkServerMaterial>,
    /// Bootstrap client state, when material was fetched remotely
    pub network_manager_client: Option<MembershipClient>,
}

impl AuthenticationStore {
    pub fn new(cert_dir: impl Into<PathBuf>) -> Self {
        Self {
            cert_dir: cert_dir.into(),
            kine: None,
            network_manager: None,
            network_manager_client: None,
        }
    }
}

/// Log that an authority set was generated or reused, with the CA's
/// fingerprint so operators can pin it.
fn log_authority(subsystem: &str, set: &AuthoritySet, reused: bool) {
    let event = if reused {
        Event::CertificatesReused
    } else {
        Event::CertificatesGenerated
    };
    let dir = set.dir.display().to_string();
    let ca_fingerprint = fingerprint(&set.ca_cert).unwrap_or_default();
    log_event_with_fields(
        event,
        &[
            ("subsystem", subsystem),
            ("dir", dir.as_str()),
            ("ca_sha256", ca_fingerprint.as_str()),
        ],
    );
}
