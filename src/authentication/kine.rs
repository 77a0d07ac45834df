//! Self-managed server material for the embedded storage backend

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::certificate::{generate_or_reuse, LeafSpec, Usage};
use crate::reconcile::{ReconcileError, ReconcileResult};

use super::material::AuthenticationMaterial;

const KINE_DIR: &str = "kine";
const CA_NAME: &str = "leaderboot-kine-ca";
const SERVER_LEAF: &str = "server";

/// Generator for the storage backend's CA and server certificate, bound to
/// one bind address.
#[derive(Debug, Clone)]
pub struct KineAuthentication {
    dir: PathBuf,
    bind_address: String,
}

impl KineAuthentication {
    pub fn new(cert_dir: impl AsRef<Path>, bind_address: impl Into<String>) -> Self {
        Self {
            dir: cert_dir.as_ref().join(KINE_DIR),
            bind_address: bind_address.into(),
        }
    }

    /// Generate the material, or reuse what a previous run left behind if it
    /// still covers the bind address.
    pub fn generate_or_skip(&self) -> ReconcileResult<AuthenticationMaterial> {
        let ip: IpAddr = self.bind_address.parse().map_err(|_| {
            ReconcileError::certificate_failed(format!(
                "kine bind address '{}' is not an IP address",
                self.bind_address
            ))
        })?;
        let leaves = [LeafSpec::new(SERVER_LEAF, "kine-server", Usage::Server, vec![ip])];
        let (set, reused) = generate_or_reuse(&self.dir, CA_NAME, &leaves)?;

        super::log_authority("kine", &set, reused);

        let server = set.leaf(SERVER_LEAF).ok_or_else(|| {
            ReconcileError::certificate_failed("kine server certificate missing from set")
        })?;
        Ok(AuthenticationMaterial::self_managed(
            &set.ca_cert,
            &server.cert,
            &server.key,
        ))
    }
}
