//! API front-end reconciler

use crate::options::{ApiServerDefaults, EffectiveApiServer, RawApiServer};
use crate::validation::{self, Resolved};

use super::errors::ReconcileResult;

const CLUSTER_IP_RANGE_FLAG: &str = "service-cluster-ip-range";
const NODE_PORT_RANGE_FLAG: &str = "service-node-port-range";

/// Reconcile API front-end options.
///
/// Pass-through fields are copied verbatim. Operator values that were
/// rejected for the service ranges are recorded in `ignore_options` under
/// their flag name, next to whatever the operator already listed there.
pub fn reconcile_apiserver(raw: &RawApiServer) -> ReconcileResult<EffectiveApiServer> {
    let cluster_ip_range = validation::cidr(
        "apiserver.service-cluster-ip-range",
        &raw.service_cluster_ip_range,
        ApiServerDefaults::SERVICE_CLUSTER_IP_RANGE,
    )?;
    let node_port_range = validation::node_port_range(
        "apiserver.service-node-port-range",
        &raw.service_node_port_range,
        ApiServerDefaults::SERVICE_NODE_PORT_RANGE,
    )?;
    let secure_port = validation::port(
        "apiserver.secure-port",
        raw.secure_port,
        ApiServerDefaults::SECURE_PORT,
    )?
    .value;

    let mut ignore_options = raw.ignore_options.clone();
    record_rejected(&mut ignore_options, CLUSTER_IP_RANGE_FLAG, &cluster_ip_range);
    record_rejected(&mut ignore_options, NODE_PORT_RANGE_FLAG, &node_port_range);

    Ok(EffectiveApiServer {
        allow_privileged: raw.allow_privileged,
        authorization_mode: raw.authorization_mode.clone(),
        anonymous_auth: raw.anonymous_auth,
        enable_swagger_ui: raw.enable_swagger_ui,
        enable_admission_plugins: raw.enable_admission_plugins.clone(),
        encryption_provider_config: raw.encryption_provider_config.clone(),
        profiling: raw.profiling,
        service_cluster_ip_range: cluster_ip_range.value,
        service_node_port_range: node_port_range.value,
        secure_port,
        etcd_servers: raw.etcd_servers.trim().to_string(),
        reserved_options: raw.reserved_options.clone(),
        ignore_options,
    })
}

fn record_rejected(
    ignore_options: &mut std::collections::BTreeMap<String, String>,
    flag: &str,
    resolved: &Resolved<String>,
) {
    if let Some(rejected) = resolved.rejected.as_deref().filter(|r| !r.is_empty()) {
        ignore_options.insert(flag.to_string(), rejected.to_string());
    }
}
