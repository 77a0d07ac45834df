use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::authentication::Provenance;

/// Defaults of the embedded storage backend.
pub struct KineDefaults;

impl KineDefaults {
    pub const BIND_ADDRESS: &'static str = "127.0.0.1";
    pub const SECURE_PORT: u16 = 2379;
}

/// Operator-supplied storage backend options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawKine {
    pub bind_address: String,
    /// Signed so out-of-range input survives deserialization and can be
    /// replaced by the default.
    pub secure_port: i64,
    pub ca_cert: String,
    pub server_cert_file: String,
    pub server_key_file: String,
}

/// Reconciled storage backend options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EffectiveKine {
    pub bind_address: String,
    pub secure_port: u16,
    pub ca_cert: PathBuf,
    pub server_cert_file: PathBuf,
    pub server_key_file: PathBuf,
    pub provenance: Provenance,
}
