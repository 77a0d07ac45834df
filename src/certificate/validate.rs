//! Certificate validation
//!
//! Stateless checks over PEM files on disk. Every function answers a yes/no
//! question; unreadable or unparsable input is simply "no".

use std::fs;
use std::io::{self, BufRead, Cursor};
use std::net::IpAddr;
use std::path::Path;

use rcgen::KeyPair;
use rustls_pemfile::{ec_private_keys, pkcs8_private_keys, rsa_private_keys};
use sha2::{Digest, Sha256};
use x509_parser::certificate::X509Certificate;
use x509_parser::der_parser::ber::{BerObject, BerObjectContent};
use x509_parser::der_parser::der::{parse_der, parse_der_sequence};
use x509_parser::extensions::GeneralName;
use x509_parser::pem::{parse_x509_pem, Pem};
use x509_parser::public_key::PublicKey;

/// Private key encodings accepted on disk.
enum PrivateKey {
    /// `PRIVATE KEY`, kept as PEM text
    Pkcs8(String),
    /// `RSA PRIVATE KEY`
    Pkcs1(Vec<u8>),
    /// `EC PRIVATE KEY`
    Sec1(Vec<u8>),
}

/// Returns true if any of the paths is empty or does not name an existing file.
pub fn not_exists<P: AsRef<Path>>(paths: &[P]) -> bool {
    paths.iter().any(|p| {
        let p = p.as_ref();
        p.as_os_str().is_empty() || !p.is_file()
    })
}

/// Returns true if the key at `key_path` is the private half of the
/// certificate at `cert_path`.
pub fn validate_tls_pair(cert_path: impl AsRef<Path>, key_path: impl AsRef<Path>) -> bool {
    let Some(pem) = read_pem(cert_path.as_ref()) else {
        return false;
    };
    let Ok(cert) = pem.parse_x509() else {
        return false;
    };
    let Some(key) = read_private_key(key_path.as_ref()) else {
        return false;
    };
    key_matches(&cert, &key)
}

/// Returns true if the certificate at `cert_path` was issued and signed by
/// the CA certificate at `ca_path`.
pub fn validate_ca(cert_path: impl AsRef<Path>, ca_path: impl AsRef<Path>) -> bool {
    let (Some(cert_pem), Some(ca_pem)) = (read_pem(cert_path.as_ref()), read_pem(ca_path.as_ref()))
    else {
        return false;
    };
    let (Ok(cert), Ok(ca)) = (cert_pem.parse_x509(), ca_pem.parse_x509()) else {
        return false;
    };
    if cert.issuer().as_raw() != ca.subject().as_raw() {
        return false;
    }
    cert.verify_signature(Some(ca.public_key())).is_ok()
}

/// Returns true if the certificate is currently within its validity window
/// and lists `ip` among its subject alternative names.
pub fn covers_ip(cert_path: impl AsRef<Path>, ip: IpAddr) -> bool {
    let Some(pem) = read_pem(cert_path.as_ref()) else {
        return false;
    };
    let Ok(cert) = pem.parse_x509() else {
        return false;
    };
    if !cert.validity().is_valid() {
        return false;
    }
    let Ok(Some(san)) = cert.subject_alternative_name() else {
        return false;
    };
    let wanted: Vec<u8> = match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    };
    san.value
        .general_names
        .iter()
        .any(|name| matches!(name, GeneralName::IPAddress(bytes) if *bytes == wanted.as_slice()))
}

/// SHA-256 fingerprint (lowercase hex) of the certificate's DER encoding.
pub fn fingerprint(cert_path: impl AsRef<Path>) -> Option<String> {
    let pem = read_pem(cert_path.as_ref())?;
    Some(format!("{:x}", Sha256::digest(&pem.contents)))
}

fn read_private_key(path: &Path) -> Option<PrivateKey> {
    let pem = fs::read(path).ok()?;
    if first_key(&pem, pkcs8_private_keys).is_some() {
        return String::from_utf8(pem).ok().map(PrivateKey::Pkcs8);
    }
    if let Some(der) = first_key(&pem, rsa_private_keys) {
        return Some(PrivateKey::Pkcs1(der));
    }
    first_key(&pem, ec_private_keys).map(PrivateKey::Sec1)
}

fn first_key(
    pem: &[u8],
    read: fn(&mut dyn BufRead) -> io::Result<Vec<Vec<u8>>>,
) -> Option<Vec<u8>> {
    read(&mut Cursor::new(pem)).ok()?.into_iter().next()
}

fn key_matches(cert: &X509Certificate, key: &PrivateKey) -> bool {
    let spki = cert.public_key();
    match key {
        PrivateKey::Pkcs8(pem) => KeyPair::from_pem(pem)
            .map(|pair| spki.subject_public_key.data.as_ref() == pair.public_key_raw())
            .unwrap_or(false),
        PrivateKey::Pkcs1(der) => {
            let Some((modulus, exponent)) = rsa_public_parts(der) else {
                return false;
            };
            matches!(
                spki.parsed(),
                Ok(PublicKey::RSA(rsa))
                    if same_integer(rsa.modulus, modulus) && same_integer(rsa.exponent, exponent)
            )
        }
        // Keys without the optional public point are not accepted.
        PrivateKey::Sec1(der) => sec1_public_point(der)
            .is_some_and(|point| point == spki.subject_public_key.data.as_ref()),
    }
}

/// Modulus and public exponent of a PKCS#1 `RSAPrivateKey`.
fn rsa_public_parts(der: &[u8]) -> Option<(&[u8], &[u8])> {
    let (_, key) = parse_der_sequence(der).ok()?;
    let fields = key.as_sequence().ok()?;
    Some((der_integer(fields.get(1)?)?, der_integer(fields.get(2)?)?))
}

fn der_integer<'a>(object: &BerObject<'a>) -> Option<&'a [u8]> {
    match object.content {
        BerObjectContent::Integer(bytes) => Some(bytes),
        _ => None,
    }
}

/// The `[1] publicKey` point of a SEC1 `ECPrivateKey`.
fn sec1_public_point(der: &[u8]) -> Option<&[u8]> {
    let (_, key) = parse_der_sequence(der).ok()?;
    key.as_sequence().ok()?.iter().find_map(|field| match &field.content {
        BerObjectContent::Unknown(tagged) => match parse_der(tagged.data).ok()?.1.content {
            BerObjectContent::BitString(_, bits) => Some(bits.data),
            _ => None,
        },
        _ => None,
    })
}

fn same_integer(a: &[u8], b: &[u8]) -> bool {
    let strip = |bytes: &[u8]| -> Vec<u8> { bytes.iter().copied().skip_while(|b| *b == 0).collect() };
    strip(a) == strip(b)
}

fn read_pem(path: &Path) -> Option<Pem> {
    let bytes = fs::read(path).ok()?;
    if bytes.is_empty() {
        return None;
    }
    let (_, pem) = parse_x509_pem(&bytes).ok()?;
    Some(pem)
}
