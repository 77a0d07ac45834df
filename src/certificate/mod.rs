//! X.509 material for the leader's subordinate services
//!
//! - `validate`: yes/no checks over PEM files (existence, key pairing,
//!   CA chaining, IP coverage)
//! - `generate`: self-signed CA plus leaf certificates, generated or reused

mod errors;
pub mod generate;
pub mod validate;

pub use errors::{CertError, CertResult};
pub(crate) use generate::write_pem;
pub use generate::{generate_or_reuse, write_authority_set, AuthoritySet, LeafFiles, LeafSpec, Usage};
pub use validate::{covers_ip, fingerprint, not_exists, validate_ca, validate_tls_pair};
