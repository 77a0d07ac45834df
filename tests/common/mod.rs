//! Shared fixtures for integration tests
//!
//! - Operator certificate sets minted with the crate's own generator
//! - openssl-issued fixtures with SEC1 and PKCS#1 keys under `tests/fixtures`
//! - A fake bootstrap exchange that serves minted material and counts calls
//! - Raw option builders rooted in a temporary work directory

#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use leaderboot::authentication::{BootstrapBundle, BootstrapExchange, BootstrapRequest, PemBundle};
use leaderboot::certificate::{write_authority_set, LeafSpec, Usage};
use leaderboot::observability::Logger;
use leaderboot::options::{RawEndpoint, RawKine, RawOptions};
use leaderboot::reconcile::{ReconcileError, ReconcileResult};
use tempfile::TempDir;

pub const TOKEN: &str = "abcdefgh12345678";

/// Silence structured logging for the test process.
pub fn quiet() {
    Logger::set_quiet(true);
}

/// Raw options with every field empty except the work directory.
pub fn raw_in(work: &TempDir) -> RawOptions {
    let mut raw = RawOptions::default();
    raw.global.work_dir = work.path().display().to_string();
    raw
}

/// Raw options for a leader that is a client of a remote membership service.
pub fn remote_raw_in(work: &TempDir) -> RawOptions {
    let mut raw = raw_in(work);
    raw.global.run_network_manager = false;
    raw.network_manager.token = TOKEN.to_string();
    raw
}

/// Operator-supplied storage backend material under `dir`.
pub fn operator_kine(dir: &Path) -> RawKine {
    let set = write_authority_set(
        dir,
        "operator-kine-ca",
        &[LeafSpec::new("server", "kine", Usage::Server, vec![])],
    )
    .expect("mint kine set");
    let leaf = set.leaf("server").expect("server leaf");
    RawKine {
        bind_address: "127.0.0.1".to_string(),
        secure_port: 2379,
        ca_cert: set.ca_cert.display().to_string(),
        server_cert_file: leaf.cert.display().to_string(),
        server_key_file: leaf.key.display().to_string(),
    }
}

/// Operator-supplied client material for one membership endpoint under `dir`.
pub fn operator_endpoint(dir: &Path, address: &str, port: i64) -> RawEndpoint {
    let set = write_authority_set(
        dir,
        "operator-network-ca",
        &[LeafSpec::new("client", "leader", Usage::Client, vec![])],
    )
    .expect("mint endpoint set");
    let leaf = set.leaf("client").expect("client leaf");
    RawEndpoint {
        address: address.to_string(),
        secure_port: port,
        ca_cert: set.ca_cert.display().to_string(),
        client_cert_file: leaf.cert.display().to_string(),
        client_key_file: leaf.key.display().to_string(),
    }
}

/// Path of a checked-in fixture. `ca.crt` signs `ec-leaf.crt` (SEC1 key) and
/// `rsa-leaf.crt` (PKCS#1 key); both leaves cover 127.0.0.1.
pub fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .display()
        .to_string()
}

/// Storage backend material from the openssl fixtures, `leaf` being `ec` or `rsa`.
pub fn fixture_kine(leaf: &str) -> RawKine {
    RawKine {
        bind_address: "127.0.0.1".to_string(),
        secure_port: 2379,
        ca_cert: fixture("ca.crt"),
        server_cert_file: fixture(&format!("{}-leaf.crt", leaf)),
        server_key_file: fixture(&format!("{}-leaf.key", leaf)),
    }
}

/// Membership client material from the openssl fixtures.
pub fn fixture_endpoint(leaf: &str, address: &str, port: i64) -> RawEndpoint {
    RawEndpoint {
        address: address.to_string(),
        secure_port: port,
        ca_cert: fixture("ca.crt"),
        client_cert_file: fixture(&format!("{}-leaf.crt", leaf)),
        client_key_file: fixture(&format!("{}-leaf.key", leaf)),
    }
}

fn mint_bundle() -> PemBundle {
    let dir = TempDir::new().expect("temp dir");
    let set = write_authority_set(
        dir.path(),
        "remote-network-ca",
        &[LeafSpec::new("client", "node", Usage::Client, vec![])],
    )
    .expect("mint remote set");
    let leaf = set.leaf("client").expect("client leaf");
    PemBundle {
        ca_cert: fs::read_to_string(&set.ca_cert).expect("read ca"),
        cert: fs::read_to_string(&leaf.cert).expect("read cert"),
        key: fs::read_to_string(&leaf.key).expect("read key"),
    }
}

/// Serves freshly minted client material and records every request.
pub struct FakeExchange {
    pub calls: Cell<usize>,
    pub last_request: Cell<Option<(String, u16)>>,
    node_token: String,
    fail: bool,
}

impl FakeExchange {
    pub fn serving(node_token: &str) -> Self {
        Self {
            calls: Cell::new(0),
            last_request: Cell::new(None),
            node_token: node_token.to_string(),
            fail: false,
        }
    }

    pub fn refusing() -> Self {
        Self {
            fail: true,
            ..Self::serving("")
        }
    }
}

impl BootstrapExchange for FakeExchange {
    fn fetch(&self, request: &BootstrapRequest) -> ReconcileResult<BootstrapBundle> {
        self.calls.set(self.calls.get() + 1);
        self.last_request
            .set(Some((request.address.clone(), request.port)));
        if self.fail {
            return Err(ReconcileError::bootstrap_failed("remote refused the token"));
        }
        Ok(BootstrapBundle {
            register: mint_bundle(),
            join: mint_bundle(),
            node_token: self.node_token.clone(),
        })
    }
}
