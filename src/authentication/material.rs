use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where a subsystem's certificates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Paths point at files the operator provided; they were validated.
    OperatorSupplied,
    /// Paths point into the engine's certificate directory.
    SelfManaged,
}

/// CA, certificate, and key paths for one TLS identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationMaterial {
    pub ca_cert: PathBuf,
    pub cert: PathBuf,
    pub key: PathBuf,
    pub provenance: Provenance,
}

impl AuthenticationMaterial {
    pub fn self_managed(
        ca_cert: impl Into<PathBuf>,
        cert: impl Into<PathBuf>,
        key: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ca_cert: ca_cert.into(),
            cert: cert.into(),
            key: key.into(),
            provenance: Provenance::SelfManaged,
        }
    }

    pub fn operator_supplied(
        ca_cert: impl Into<PathBuf>,
        cert: impl Into<PathBuf>,
        key: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ca_cert: ca_cert.into(),
            cert: cert.into(),
            key: key.into(),
            provenance: Provenance::OperatorSupplied,
        }
    }
}
