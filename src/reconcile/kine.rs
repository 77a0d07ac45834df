//! Storage backend (kine) reconciler

use crate::authentication::{AuthenticationMaterial, KineAuthentication};
use crate::certificate::{not_exists, validate_ca, validate_tls_pair};
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::options::{EffectiveGlobal, EffectiveKine, KineDefaults, RawKine};
use crate::validation;

use super::errors::{ReconcileError, ReconcileResult};

/// Output of the storage backend reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KineOutcome {
    pub options: EffectiveKine,
    pub material: AuthenticationMaterial,
}

/// Reconcile storage backend options. Returns `None` when global
/// reconciliation decided the backend does not run.
pub fn reconcile_kine(raw: &RawKine, global: &EffectiveGlobal) -> ReconcileResult<Option<KineOutcome>> {
    if !global.run_kine {
        log_event(Event::KineSkipped);
        return Ok(None);
    }

    let bind_address = validation::ip_address(
        "kine.bind-address",
        &raw.bind_address,
        KineDefaults::BIND_ADDRESS,
    )?
    .value;
    let secure_port =
        validation::port("kine.secure-port", raw.secure_port, KineDefaults::SECURE_PORT)?.value;

    let material = if not_exists(&[&raw.ca_cert, &raw.server_cert_file, &raw.server_key_file]) {
        let material = KineAuthentication::new(global.tls_dir(), &bind_address).generate_or_skip()?;
        let dir = global.tls_dir().display().to_string();
        log_event_with_fields(Event::KineSelfManaged, &[("cert_dir", dir.as_str())]);
        material
    } else {
        if !validate_tls_pair(&raw.server_cert_file, &raw.server_key_file)
            || !validate_ca(&raw.server_cert_file, &raw.ca_cert)
        {
            return Err(ReconcileError::untrusted_material(
                "you specified an unavailable certificate for kine",
            ));
        }
        log_event(Event::KineOperatorSupplied);
        AuthenticationMaterial::operator_supplied(
            &raw.ca_cert,
            &raw.server_cert_file,
            &raw.server_key_file,
        )
    };

    let options = EffectiveKine {
        bind_address,
        secure_port,
        ca_cert: material.ca_cert.clone(),
        server_cert_file: material.cert.clone(),
        server_key_file: material.key.clone(),
        provenance: material.provenance,
    };
    Ok(Some(KineOutcome { options, material }))
}
