//! # Certificate Errors

use thiserror::Error;

/// Result type for certificate generation
pub type CertResult<T> = Result<T, CertError>;

/// Certificate generation and persistence errors
#[derive(Debug, Error)]
pub enum CertError {
    /// Key pair generation failed
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Certificate signing failed
    #[error("certificate signing failed for '{subject}': {details}")]
    Signing { subject: String, details: String },

    /// A certificate or key could not be written
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A certificate directory could not be created
    #[error("failed to create certificate directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<rcgen::Error> for CertError {
    fn from(e: rcgen::Error) -> Self {
        CertError::KeyGeneration(e.to_string())
    }
}
