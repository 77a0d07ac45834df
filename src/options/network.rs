use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::authentication::Provenance;

/// Token value reserved for a membership service embedded in this process.
pub const LOCAL_TOKEN: &str = "local";

/// Required length of a network bootstrap token.
pub const TOKEN_LEN: usize = 16;

/// Defaults of one membership endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDefaults {
    pub address: &'static str,
    pub secure_port: u16,
}

pub const REGISTER_DEFAULTS: EndpointDefaults = EndpointDefaults {
    address: "127.0.0.1",
    secure_port: 6440,
};

pub const JOIN_DEFAULTS: EndpointDefaults = EndpointDefaults {
    address: "127.0.0.1",
    secure_port: 6441,
};

/// Operator-supplied options for one membership endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawEndpoint {
    pub address: String,
    pub secure_port: i64,
    pub ca_cert: String,
    pub client_cert_file: String,
    pub client_key_file: String,
}

/// Operator-supplied membership options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawNetworkManager {
    pub token: String,
    pub node_token: String,
    pub register: RawEndpoint,
    pub join: RawEndpoint,
}

/// Reconciled options for one membership endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EffectiveEndpoint {
    pub address: String,
    pub secure_port: u16,
    pub ca_cert: PathBuf,
    pub client_cert_file: PathBuf,
    pub client_key_file: PathBuf,
}

/// Reconciled membership options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EffectiveNetworkManager {
    pub token: String,
    /// Present iff the membership service is remote.
    pub node_token: Option<String>,
    pub register: EffectiveEndpoint,
    pub join: EffectiveEndpoint,
    pub provenance: Provenance,
}

impl EffectiveNetworkManager {
    /// Whether the membership service runs inside this process.
    pub fn is_local(&self) -> bool {
        self.token == LOCAL_TOKEN
    }
}
