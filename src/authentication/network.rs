//! Self-managed material for a membership service embedded in this process
//!
//! The register and join endpoints each get their own CA. Under each CA the
//! engine issues a server certificate for the endpoint's address and a client
//! certificate the leader itself uses to reach the endpoint.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::certificate::{generate_or_reuse, AuthoritySet, LeafSpec, Usage};
use crate::reconcile::{ReconcileError, ReconcileResult};

use super::material::AuthenticationMaterial;

const NETWORK_DIR: &str = "network-manager";
const SERVER_LEAF: &str = "server";
const CLIENT_LEAF: &str = "client";

/// Material for one membership endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointMaterial {
    /// CA, server certificate, server key
    pub server: AuthenticationMaterial,
    /// CA, client certificate, client key
    pub client: AuthenticationMaterial,
}

/// Material for both membership endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkServerMaterial {
    pub register: EndpointMaterial,
    pub join: EndpointMaterial,
}

/// Generator for the embedded membership service's material.
#[derive(Debug, Clone)]
pub struct NetworkAuthentication {
    dir: PathBuf,
    register_address: String,
    join_address: String,
}

impl NetworkAuthentication {
    pub fn new(
        cert_dir: impl AsRef<Path>,
        register_address: impl Into<String>,
        join_address: impl Into<String>,
    ) -> Self {
        Self {
            dir: cert_dir.as_ref().join(NETWORK_DIR),
            register_address: register_address.into(),
            join_address: join_address.into(),
        }
    }

    /// Generate (or reuse) register and join material.
    pub fn generate_or_skip(&self) -> ReconcileResult<NetworkServerMaterial> {
        Ok(NetworkServerMaterial {
            register: self.endpoint("register", &self.register_address)?,
            join: self.endpoint("join", &self.join_address)?,
        })
    }

    fn endpoint(&self, name: &'static str, address: &str) -> ReconcileResult<EndpointMaterial> {
        let ip: IpAddr = address.parse().map_err(|_| {
            ReconcileError::certificate_failed(format!(
                "network-manager {} address '{}' is not an IP address",
                name, address
            ))
        })?;
        let dir = self.dir.join(name);
        let leaves = [
            LeafSpec::new(
                SERVER_LEAF,
                format!("network-manager-{}", name),
                Usage::Server,
                vec![ip],
            ),
            LeafSpec::new(
                CLIENT_LEAF,
                format!("network-manager-{}-leader", name),
                Usage::Client,
                vec![],
            ),
        ];
        let ca_name = format!("leaderboot-network-manager-{}-ca", name);
        let (set, reused) = generate_or_reuse(&dir, &ca_name, &leaves)?;

        super::log_authority("network-manager", &set, reused);

        Ok(EndpointMaterial {
            server: leaf_material(&set, SERVER_LEAF)?,
            client: leaf_material(&set, CLIENT_LEAF)?,
        })
    }
}

fn leaf_material(set: &AuthoritySet, name: &str) -> ReconcileResult<AuthenticationMaterial> {
    let leaf = set.leaf(name).ok_or_else(|| {
        ReconcileError::certificate_failed(format!("{} certificate missing from set", name))
    })?;
    Ok(AuthenticationMaterial::self_managed(
        &set.ca_cert,
        &leaf.cert,
        &leaf.key,
    ))
}
