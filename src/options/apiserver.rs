use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Defaults of the API front end.
pub struct ApiServerDefaults;

impl ApiServerDefaults {
    pub const SERVICE_CLUSTER_IP_RANGE: &'static str = "10.0.0.0/16";
    pub const SERVICE_NODE_PORT_RANGE: &'static str = "30000-32767";
    pub const SECURE_PORT: u16 = 6443;
    /// Substituted for an unparseable lower node-port bound.
    pub const NODE_PORT_MIN_FALLBACK: i64 = 30000;
    /// Substituted for an unparseable upper node-port bound.
    pub const NODE_PORT_MAX_FALLBACK: i64 = 65535;
    /// A node-port range must span more than this many ports.
    pub const NODE_PORT_MIN_SPAN: i64 = 100;
}

/// Operator-supplied API front-end options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawApiServer {
    pub allow_privileged: bool,
    pub authorization_mode: String,
    pub anonymous_auth: bool,
    pub enable_swagger_ui: bool,
    pub enable_admission_plugins: String,
    pub encryption_provider_config: String,
    pub profiling: bool,
    pub service_cluster_ip_range: String,
    pub service_node_port_range: String,
    pub secure_port: i64,
    /// External storage endpoints; empty means the embedded backend is used.
    pub etcd_servers: String,
    /// Flags handed to the API server untouched.
    pub reserved_options: BTreeMap<String, String>,
    /// Flags the operator asked to ignore.
    pub ignore_options: BTreeMap<String, String>,
}

/// Reconciled API front-end options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EffectiveApiServer {
    pub allow_privileged: bool,
    pub authorization_mode: String,
    pub anonymous_auth: bool,
    pub enable_swagger_ui: bool,
    pub enable_admission_plugins: String,
    pub encryption_provider_config: String,
    pub profiling: bool,
    pub service_cluster_ip_range: String,
    pub service_node_port_range: String,
    pub secure_port: u16,
    pub etcd_servers: String,
    pub reserved_options: BTreeMap<String, String>,
    /// Operator values that were rejected and replaced, keyed by flag name.
    pub ignore_options: BTreeMap<String, String>,
}
