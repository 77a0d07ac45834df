//! Network-membership (network manager) reconciler
//!
//! Two endpoints (register, join), one bootstrap token, client credentials,
//! and the split between hosting the membership service in this process and
//! being a client of a remote one:
//!
//! | hosting | operator credentials | result                                   |
//! |---------|----------------------|------------------------------------------|
//! | yes     | ignored              | token `local`, self-managed material     |
//! | no      | none at all          | bootstrap exchange with the token        |
//! | no      | some                 | all of them must validate, else abort    |

use std::path::PathBuf;

use crate::authentication::{
    AuthenticationMaterial, BootstrapExchange, MembershipClient, NetworkAuthentication,
    NetworkServerMaterial, Provenance,
};
use crate::certificate::{not_exists, validate_ca, validate_tls_pair};
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::options::{
    EffectiveEndpoint, EffectiveGlobal, EffectiveNetworkManager, EndpointDefaults, RawEndpoint,
    RawNetworkManager, JOIN_DEFAULTS, LOCAL_TOKEN, REGISTER_DEFAULTS,
};
use crate::validation;

use super::errors::{ReconcileError, ReconcileResult};

/// How the leader authenticates to the membership service.
#[derive(Debug, Clone)]
pub enum MembershipAuthentication {
    /// The service runs in this process; the engine owns all material.
    Hosted(NetworkServerMaterial),
    /// Material was fetched (or reused) through a bootstrap exchange.
    Bootstrapped(MembershipClient),
    /// The operator supplied every credential and they validated.
    OperatorSupplied,
}

/// Output of the network-membership reconciler.
#[derive(Debug, Clone)]
pub struct NetworkOutcome {
    pub options: EffectiveNetworkManager,
    pub authentication: MembershipAuthentication,
}

/// Resolved address and port of one endpoint.
struct Socket {
    address: String,
    port: u16,
}

fn resolve_socket(name: &str, raw: &RawEndpoint, defaults: EndpointDefaults) -> ReconcileResult<Socket> {
    let address = validation::ip_address(
        &format!("network-manager.{}.address", name),
        &raw.address,
        defaults.address,
    )?
    .value;
    let port = validation::port(
        &format!("network-manager.{}.secure-port", name),
        raw.secure_port,
        defaults.secure_port,
    )?
    .value;
    Ok(Socket { address, port })
}

fn endpoint(socket: Socket, material: &AuthenticationMaterial) -> EffectiveEndpoint {
    EffectiveEndpoint {
        address: socket.address,
        secure_port: socket.port,
        ca_cert: material.ca_cert.clone(),
        client_cert_file: material.cert.clone(),
        client_key_file: material.key.clone(),
    }
}

fn has_no_material(raw: &RawEndpoint) -> bool {
    not_exists(&[&raw.ca_cert, &raw.client_cert_file, &raw.client_key_file])
}

fn is_trusted(raw: &RawEndpoint) -> bool {
    validate_tls_pair(&raw.client_cert_file, &raw.client_key_file)
        && validate_ca(&raw.client_cert_file, &raw.ca_cert)
}

/// Reconcile membership options.
///
/// `exchange` is only used when the node must bootstrap its credentials.
pub fn reconcile_network_manager(
    raw: &RawNetworkManager,
    global: &EffectiveGlobal,
    exchange: &dyn BootstrapExchange,
) -> ReconcileResult<NetworkOutcome> {
    let register = resolve_socket("register", &raw.register, REGISTER_DEFAULTS)?;
    let join = resolve_socket("join", &raw.join, JOIN_DEFAULTS)?;
    let cert_dir = global.tls_dir();

    if global.run_network_manager {
        let material = NetworkAuthentication::new(&cert_dir, &register.address, &join.address)
            .generate_or_skip()?;
        log_event_with_fields(
            Event::MembershipHosted,
            &[("register", register.address.as_str()), ("join", join.address.as_str())],
        );
        let options = EffectiveNetworkManager {
            token: LOCAL_TOKEN.to_string(),
            node_token: None,
            register: endpoint(register, &material.register.client),
            join: endpoint(join, &material.join.client),
            provenance: Provenance::SelfManaged,
        };
        return Ok(NetworkOutcome {
            options,
            authentication: MembershipAuthentication::Hosted(material),
        });
    }

    let token = validation::bootstrap_token("network-manager.token", &raw.token)?;

    if has_no_material(&raw.register) && has_no_material(&raw.join) && raw.node_token.is_empty() {
        let client = MembershipClient::new(&cert_dir, &token);
        client.obtain(exchange, &register.address, register.port)?;
        if !client.check() {
            return Err(ReconcileError::bootstrap_failed(
                "fail to load network-manager TLS args",
            ));
        }
        let node_token = client.node_token()?;
        let dir = client.dir().display().to_string();
        log_event_with_fields(Event::BootstrapComplete, &[("dir", dir.as_str())]);

        let options = EffectiveNetworkManager {
            token,
            node_token: Some(node_token),
            register: endpoint(register, &client.register()),
            join: endpoint(join, &client.join()),
            provenance: Provenance::SelfManaged,
        };
        return Ok(NetworkOutcome {
            options,
            authentication: MembershipAuthentication::Bootstrapped(client),
        });
    }

    if !(is_trusted(&raw.join) && is_trusted(&raw.register) && !raw.node_token.is_empty()) {
        return Err(ReconcileError::incomplete_credentials(
            "bad network-manager client certificates or node-token: register and join \
             certificates and a node-token must all be supplied and valid",
        ));
    }
    log_event(Event::MembershipOperatorSupplied);

    let supplied = |e: &RawEndpoint| {
        AuthenticationMaterial::operator_supplied(
            PathBuf::from(&e.ca_cert),
            PathBuf::from(&e.client_cert_file),
            PathBuf::from(&e.client_key_file),
        )
    };
    let options = EffectiveNetworkManager {
        token,
        node_token: Some(raw.node_token.clone()),
        register: endpoint(register, &supplied(&raw.register)),
        join: endpoint(join, &supplied(&raw.join)),
        provenance: Provenance::OperatorSupplied,
    };
    Ok(NetworkOutcome {
        options,
        authentication: MembershipAuthentication::OperatorSupplied,
    })
}
