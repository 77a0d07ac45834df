//! Token-authenticated bootstrap against a remote membership service
//!
//! A node that neither hosts the membership service nor holds client
//! credentials presents its bootstrap token to the remote register endpoint
//! and receives client certificates for both endpoints plus a node token.
//!
//! Fetched material is written under `<tls>/network-manager-client/`:
//!
//! ```text
//! register/{ca.crt,client.crt,client.key}
//! join/{ca.crt,client.crt,client.key}
//! node.token
//! ```

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::certificate::{not_exists, validate_ca, validate_tls_pair, write_pem, CertError};
use crate::observability::{log_event_with_fields, Event};
use crate::reconcile::{ReconcileError, ReconcileResult};

use super::material::AuthenticationMaterial;

const CLIENT_DIR: &str = "network-manager-client";
const NODE_TOKEN_FILE: &str = "node.token";
const BOOTSTRAP_PATH: &str = "/bootstrap";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// What the engine asks the remote membership service for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapRequest {
    pub address: String,
    pub port: u16,
    pub token: String,
}

/// PEM material for one endpoint, as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PemBundle {
    pub ca_cert: String,
    pub cert: String,
    pub key: String,
}

/// Response of a bootstrap exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapBundle {
    pub register: PemBundle,
    pub join: PemBundle,
    pub node_token: String,
}

/// The network half of a bootstrap exchange.
pub trait BootstrapExchange {
    /// Fetch client material and a node token.
    fn fetch(&self, request: &BootstrapRequest) -> ReconcileResult<BootstrapBundle>;
}

/// Bootstrap exchange over HTTPS.
///
/// The remote server's certificate is not verified for this one request: the
/// token authenticates the exchange, and the CA it returns pins every later
/// connection.
#[derive(Debug, Clone)]
pub struct HttpBootstrapExchange {
    timeout: Duration,
}

impl Default for HttpBootstrapExchange {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl HttpBootstrapExchange {
    /// URL of the bootstrap endpoint for a request.
    pub fn url(request: &BootstrapRequest) -> ReconcileResult<String> {
        let ip: IpAddr = request.address.parse().map_err(|_| {
            ReconcileError::bootstrap_failed(format!(
                "register address '{}' is not an IP address",
                request.address
            ))
        })?;
        Ok(format!(
            "https://{}{}",
            SocketAddr::new(ip, request.port),
            BOOTSTRAP_PATH
        ))
    }

    async fn fetch_async(&self, request: &BootstrapRequest) -> ReconcileResult<BootstrapBundle> {
        let url = Self::url(request)?;
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| {
                ReconcileError::bootstrap_failed(format!("failed to build HTTP client: {}", e))
            })?;

        let response = client
            .post(&url)
            .bearer_auth(&request.token)
            .send()
            .await
            .map_err(|e| {
                ReconcileError::bootstrap_failed(format!(
                    "failed to reach network-manager at {}: {}",
                    url, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReconcileError::bootstrap_failed(format!(
                "network-manager rejected bootstrap with HTTP {}",
                status.as_u16()
            )));
        }

        response.json::<BootstrapBundle>().await.map_err(|e| {
            ReconcileError::bootstrap_failed(format!("invalid bootstrap response: {}", e))
        })
    }
}

impl BootstrapExchange for HttpBootstrapExchange {
    fn fetch(&self, request: &BootstrapRequest) -> ReconcileResult<BootstrapBundle> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                ReconcileError::bootstrap_failed(format!("failed to start runtime: {}", e))
            })?;
        runtime.block_on(self.fetch_async(request))
    }
}

/// Client-side bootstrap state: the token and where fetched material lives.
#[derive(Debug, Clone)]
pub struct MembershipClient {
    dir: PathBuf,
    token: String,
}

impl MembershipClient {
    pub fn new(cert_dir: impl AsRef<Path>, token: impl Into<String>) -> Self {
        Self {
            dir: cert_dir.as_ref().join(CLIENT_DIR),
            token: token.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn register(&self) -> AuthenticationMaterial {
        self.endpoint("register")
    }

    pub fn join(&self) -> AuthenticationMaterial {
        self.endpoint("join")
    }

    pub fn node_token_path(&self) -> PathBuf {
        self.dir.join(NODE_TOKEN_FILE)
    }

    fn endpoint(&self, name: &str) -> AuthenticationMaterial {
        let dir = self.dir.join(name);
        AuthenticationMaterial::self_managed(
            dir.join("ca.crt"),
            dir.join("client.crt"),
            dir.join("client.key"),
        )
    }

    /// Make sure usable client material is on disk: reuse what a previous run
    /// fetched, or run the exchange against `address:port`.
    pub fn obtain(
        &self,
        exchange: &dyn BootstrapExchange,
        address: &str,
        port: u16,
    ) -> ReconcileResult<()> {
        let dir = self.dir.display().to_string();
        if self.check() {
            log_event_with_fields(Event::BootstrapReused, &[("dir", dir.as_str())]);
            return Ok(());
        }

        let port_str = port.to_string();
        log_event_with_fields(
            Event::BootstrapExchange,
            &[("address", address), ("port", port_str.as_str())],
        );
        let request = BootstrapRequest {
            address: address.to_string(),
            port,
            token: self.token.clone(),
        };
        let bundle = exchange.fetch(&request)?;
        self.store(&bundle)
            .map_err(|e| ReconcileError::bootstrap_failed(e.to_string()))?;
        Ok(())
    }

    /// Whether the material on disk is usable: both client pairs valid and
    /// chained to their CA, and a non-empty node token.
    pub fn check(&self) -> bool {
        let register = self.register();
        let join = self.join();
        for m in [&register, &join] {
            if not_exists(&[&m.ca_cert, &m.cert, &m.key]) {
                return false;
            }
            if !validate_tls_pair(&m.cert, &m.key) || !validate_ca(&m.cert, &m.ca_cert) {
                return false;
            }
        }
        self.node_token().is_ok()
    }

    /// The node token written by the last successful exchange.
    pub fn node_token(&self) -> ReconcileResult<String> {
        let path = self.node_token_path();
        let token = fs::read_to_string(&path).map_err(|e| {
            ReconcileError::bootstrap_failed(format!(
                "failed to read node token {}: {}",
                path.display(),
                e
            ))
        })?;
        let token = token.trim();
        if token.is_empty() {
            return Err(ReconcileError::bootstrap_failed("node token is empty"));
        }
        Ok(token.to_string())
    }

    fn store(&self, bundle: &BootstrapBundle) -> Result<(), CertError> {
        for (material, pem) in [
            (self.register(), &bundle.register),
            (self.join(), &bundle.join),
        ] {
            if let Some(parent) = material.cert.parent() {
                fs::create_dir_all(parent).map_err(|e| CertError::CreateDir {
                    path: parent.display().to_string(),
                    source: e,
                })?;
            }
            write_pem(&material.ca_cert, &pem.ca_cert, false)?;
            write_pem(&material.cert, &pem.cert, false)?;
            write_pem(&material.key, &pem.key, true)?;
        }
        write_pem(&self.node_token_path(), &bundle.node_token, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::{write_authority_set, LeafSpec, Usage};
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Serves material minted by a throwaway CA and counts requests.
    struct FakeExchange {
        calls: Cell<usize>,
        node_token: String,
    }

    impl FakeExchange {
        fn new(node_token: &str) -> Self {
            Self {
                calls: Cell::new(0),
                node_token: node_token.to_string(),
            }
        }
    }

    fn mint(name: &'static str) -> PemBundle {
        let dir = TempDir::new().unwrap();
        let set = write_authority_set(
            dir.path(),
            "remote-ca",
            &[LeafSpec::new(name, "node", Usage::Client, vec![])],
        )
        .unwrap();
        let leaf = set.leaf(name).unwrap();
        PemBundle {
            ca_cert: fs::read_to_string(&set.ca_cert).unwrap(),
            cert: fs::read_to_string(&leaf.cert).unwrap(),
            key: fs::read_to_string(&leaf.key).unwrap(),
        }
    }

    impl BootstrapExchange for FakeExchange {
        fn fetch(&self, request: &BootstrapRequest) -> ReconcileResult<BootstrapBundle> {
            self.calls.set(self.calls.get() + 1);
            assert_eq!(request.token, "abcdefgh12345678");
            Ok(BootstrapBundle {
                register: mint("client"),
                join: mint("client"),
                node_token: self.node_token.clone(),
            })
        }
    }

    #[test]
    fn test_url_formats_ipv4_and_ipv6() {
        let mut req = BootstrapRequest {
            address: "10.0.0.5".to_string(),
            port: 6440,
            token: String::new(),
        };
        assert_eq!(
            HttpBootstrapExchange::url(&req).unwrap(),
            "https://10.0.0.5:6440/bootstrap"
        );
        req.address = "fd00::5".to_string();
        assert_eq!(
            HttpBootstrapExchange::url(&req).unwrap(),
            "https://[fd00::5]:6440/bootstrap"
        );
        req.address = "not-an-ip".to_string();
        assert!(HttpBootstrapExchange::url(&req).is_err());
    }

    #[test]
    fn test_obtain_fetches_then_reuses() {
        let tls = TempDir::new().unwrap();
        let client = MembershipClient::new(tls.path(), "abcdefgh12345678");
        let exchange = FakeExchange::new("node-123");

        assert!(!client.check());
        client.obtain(&exchange, "10.0.0.5", 6440).unwrap();
        assert!(client.check());
        assert_eq!(client.node_token().unwrap(), "node-123");
        assert_eq!(exchange.calls.get(), 1);

        client.obtain(&exchange, "10.0.0.5", 6440).unwrap();
        assert_eq!(exchange.calls.get(), 1);
    }

    #[test]
    fn test_empty_node_token_fails_check() {
        let tls = TempDir::new().unwrap();
        let client = MembershipClient::new(tls.path(), "abcdefgh12345678");
        client.obtain(&FakeExchange::new("  "), "10.0.0.5", 6440).unwrap();
        assert!(!client.check());
        assert!(client.node_token().is_err());
    }

    #[test]
    fn test_layout() {
        let client = MembershipClient::new("/w/tls", "t");
        assert_eq!(
            client.register().cert,
            PathBuf::from("/w/tls/network-manager-client/register/client.crt")
        );
        assert_eq!(
            client.join().ca_cert,
            PathBuf::from("/w/tls/network-manager-client/join/ca.crt")
        );
        assert_eq!(
            client.node_token_path(),
            PathBuf::from("/w/tls/network-manager-client/node.token")
        );
    }

    #[test]
    fn test_bundle_wire_format() {
        let json = r#"{"register":{"ca_cert":"a","cert":"b","key":"c"},
                       "join":{"ca_cert":"d","cert":"e","key":"f"},
                       "node_token":"n"}"#;
        let bundle: BootstrapBundle = serde_json::from_str(json).unwrap();
        assert_eq!(bundle.join.cert, "e");
        assert_eq!(bundle.node_token, "n");
    }
}
