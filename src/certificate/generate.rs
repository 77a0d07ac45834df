//! Self-signed certificate authority generation
//!
//! An authority set is one CA plus the leaf certificates it signs, laid out in
//! a single directory:
//!
//! ```text
//! <dir>/ca.crt  <dir>/ca.key
//! <dir>/<leaf>.crt  <dir>/<leaf>.key   (one pair per leaf)
//! ```
//!
//! File names depend only on the leaf names, so repeated runs against the same
//! directory see the same paths.

use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};
use rcgen::{
    date_time_ymd, BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType,
    DnValue, ExtendedKeyUsagePurpose, IsCa, KeyPair, KeyUsagePurpose, SanType,
};

use super::errors::{CertError, CertResult};
use super::validate::{covers_ip, not_exists, validate_ca, validate_tls_pair};

/// Validity of generated material, in years.
const VALIDITY_YEARS: i32 = 10;

const CA_CERT_FILE: &str = "ca.crt";
const CA_KEY_FILE: &str = "ca.key";

/// What a leaf certificate is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// TLS server authentication
    Server,
    /// TLS client authentication
    Client,
}

/// A leaf certificate to issue under an authority.
#[derive(Debug, Clone)]
pub struct LeafSpec {
    /// File stem (`<name>.crt` / `<name>.key`)
    pub name: &'static str,
    /// Subject common name
    pub common_name: String,
    pub usage: Usage,
    /// IP subject alternative names
    pub ips: Vec<IpAddr>,
}

impl LeafSpec {
    pub fn new(
        name: &'static str,
        common_name: impl Into<String>,
        usage: Usage,
        ips: Vec<IpAddr>,
    ) -> Self {
        Self {
            name,
            common_name: common_name.into(),
            usage,
            ips,
        }
    }
}

/// Paths of one issued leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafFiles {
    pub name: String,
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Paths of a CA and its leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoritySet {
    pub dir: PathBuf,
    pub ca_cert: PathBuf,
    pub ca_key: PathBuf,
    pub leaves: Vec<LeafFiles>,
}

impl AuthoritySet {
    /// Paths an authority set for `leaves` occupies under `dir`.
    pub fn layout(dir: impl AsRef<Path>, leaves: &[LeafSpec]) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            ca_cert: dir.join(CA_CERT_FILE),
            ca_key: dir.join(CA_KEY_FILE),
            leaves: leaves
                .iter()
                .map(|leaf| LeafFiles {
                    name: leaf.name.to_string(),
                    cert: dir.join(format!("{}.crt", leaf.name)),
                    key: dir.join(format!("{}.key", leaf.name)),
                })
                .collect(),
            dir,
        }
    }

    /// Look up a leaf by name.
    pub fn leaf(&self, name: &str) -> Option<&LeafFiles> {
        self.leaves.iter().find(|l| l.name == name)
    }

    /// True if every file exists, every leaf pairs with its key and chains to
    /// the CA, and every leaf still covers the IPs it is asked to cover.
    pub fn is_usable_for(&self, leaves: &[LeafSpec]) -> bool {
        let mut paths = vec![&self.ca_cert, &self.ca_key];
        for files in &self.leaves {
            paths.push(&files.cert);
            paths.push(&files.key);
        }
        if not_exists(&paths) {
            return false;
        }
        leaves.iter().zip(&self.leaves).all(|(spec, files)| {
            validate_tls_pair(&files.cert, &files.key)
                && validate_ca(&files.cert, &self.ca_cert)
                && spec.ips.iter().all(|ip| covers_ip(&files.cert, *ip))
        })
    }
}

/// Generate a fresh CA and leaves into `dir`, overwriting whatever is there.
pub fn write_authority_set(
    dir: impl AsRef<Path>,
    ca_common_name: &str,
    leaves: &[LeafSpec],
) -> CertResult<AuthoritySet> {
    let set = AuthoritySet::layout(dir, leaves);
    fs::create_dir_all(&set.dir).map_err(|e| CertError::CreateDir {
        path: set.dir.display().to_string(),
        source: e,
    })?;

    let (ca, ca_key) = issue_ca(ca_common_name)?;
    write_pem(&set.ca_cert, &ca.pem(), false)?;
    write_pem(&set.ca_key, &ca_key.serialize_pem(), true)?;

    for (spec, files) in leaves.iter().zip(&set.leaves) {
        let (cert, key) = issue_leaf(spec, &ca, &ca_key)?;
        write_pem(&files.cert, &cert.pem(), false)?;
        write_pem(&files.key, &key.serialize_pem(), true)?;
    }

    Ok(set)
}

/// Reuse the authority set in `dir` if it is still usable for `leaves`,
/// otherwise generate a new one. Returns the set and whether it was reused.
pub fn generate_or_reuse(
    dir: impl AsRef<Path>,
    ca_common_name: &str,
    leaves: &[LeafSpec],
) -> CertResult<(AuthoritySet, bool)> {
    let existing = AuthoritySet::layout(dir.as_ref(), leaves);
    if existing.is_usable_for(leaves) {
        return Ok((existing, true));
    }
    Ok((write_authority_set(dir, ca_common_name, leaves)?, false))
}

fn distinguished_name(common_name: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, DnValue::Utf8String(common_name.to_string()));
    dn
}

fn validity(params: &mut CertificateParams) {
    let today = Utc::now().date_naive();
    let (year, month, day) = (today.year(), today.month() as u8, today.day() as u8);
    params.not_before = date_time_ymd(year, month, day);
    // Feb 29 does not exist in most target years.
    params.not_after = date_time_ymd(year + VALIDITY_YEARS, month, day.min(28));
}

fn issue_ca(common_name: &str) -> CertResult<(Certificate, KeyPair)> {
    let key = KeyPair::generate()?;
    let mut params = CertificateParams::default();
    params.distinguished_name = distinguished_name(common_name);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign,
        KeyUsagePurpose::DigitalSignature,
    ];
    validity(&mut params);

    let cert = params.self_signed(&key).map_err(|e| CertError::Signing {
        subject: common_name.to_string(),
        details: e.to_string(),
    })?;
    Ok((cert, key))
}

fn issue_leaf(
    spec: &LeafSpec,
    ca: &Certificate,
    ca_key: &KeyPair,
) -> CertResult<(Certificate, KeyPair)> {
    let key = KeyPair::generate()?;
    let mut params = CertificateParams::default();
    params.distinguished_name = distinguished_name(&spec.common_name);
    params.subject_alt_names = spec.ips.iter().map(|ip| SanType::IpAddress(*ip)).collect();
    params.is_ca = IsCa::NoCa;
    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
    ];
    params.extended_key_usages = vec![match spec.usage {
        Usage::Server => ExtendedKeyUsagePurpose::ServerAuth,
        Usage::Client => ExtendedKeyUsagePurpose::ClientAuth,
    }];
    params.use_authority_key_identifier_extension = true;
    validity(&mut params);

    let cert = params
        .signed_by(&key, ca, ca_key)
        .map_err(|e| CertError::Signing {
            subject: spec.common_name.clone(),
            details: e.to_string(),
        })?;
    Ok((cert, key))
}

pub(crate) fn write_pem(path: &Path, contents: &str, private: bool) -> CertResult<()> {
    fs::write(path, contents).map_err(|e| CertError::Write {
        path: path.display().to_string(),
        source: e,
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if private {
            fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                CertError::Write {
                    path: path.display().to_string(),
                    source: e,
                }
            })?;
        }
    }
    #[cfg(not(unix))]
    let _ = private;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tempfile::TempDir;

    fn specs(ip: IpAddr) -> Vec<LeafSpec> {
        vec![
            LeafSpec::new("server", "svc", Usage::Server, vec![ip]),
            LeafSpec::new("client", "svc-client", Usage::Client, vec![]),
        ]
    }

    #[test]
    fn test_layout_is_stable() {
        let leaves = specs(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let a = AuthoritySet::layout("/tmp/tls/kine", &leaves);
        let b = AuthoritySet::layout("/tmp/tls/kine", &leaves);
        assert_eq!(a, b);
        assert_eq!(a.ca_cert, PathBuf::from("/tmp/tls/kine/ca.crt"));
        assert_eq!(a.leaf("server").unwrap().key, PathBuf::from("/tmp/tls/kine/server.key"));
    }

    #[test]
    fn test_generated_set_is_usable() {
        let dir = TempDir::new().unwrap();
        let leaves = specs(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let set = write_authority_set(dir.path(), "test-ca", &leaves).unwrap();
        assert!(set.is_usable_for(&leaves));
    }

    #[test]
    fn test_reuse_keeps_bytes() {
        let dir = TempDir::new().unwrap();
        let leaves = specs(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let (first, reused) = generate_or_reuse(dir.path(), "test-ca", &leaves).unwrap();
        assert!(!reused);
        let before = fs::read(&first.ca_cert).unwrap();

        let (second, reused) = generate_or_reuse(dir.path(), "test-ca", &leaves).unwrap();
        assert!(reused);
        assert_eq!(first, second);
        assert_eq!(before, fs::read(&second.ca_cert).unwrap());
    }

    #[test]
    fn test_new_ip_forces_regeneration() {
        let dir = TempDir::new().unwrap();
        let local = specs(IpAddr::V4(Ipv4Addr::LOCALHOST));
        generate_or_reuse(dir.path(), "test-ca", &local).unwrap();

        let moved = specs("192.168.10.4".parse().unwrap());
        let (set, reused) = generate_or_reuse(dir.path(), "test-ca", &moved).unwrap();
        assert!(!reused);
        assert!(covers_ip(&set.leaf("server").unwrap().cert, "192.168.10.4".parse().unwrap()));
    }

    #[test]
    fn test_missing_leaf_forces_regeneration() {
        let dir = TempDir::new().unwrap();
        let leaves = specs(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let set = write_authority_set(dir.path(), "test-ca", &leaves).unwrap();
        fs::remove_file(&set.leaf("client").unwrap().key).unwrap();
        let (_, reused) = generate_or_reuse(dir.path(), "test-ca", &leaves).unwrap();
        assert!(!reused);
    }

    #[cfg(unix)]
    #[test]
    fn test_private_keys_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let leaves = specs(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let set = write_authority_set(dir.path(), "test-ca", &leaves).unwrap();
        let mode = fs::metadata(&set.ca_key).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
