//! Reconciliation error types
//!
//! Error codes:
//! - LEADER_INVALID_FIELD
//! - LEADER_INVALID_TOKEN
//! - LEADER_INCOMPLETE_CREDENTIALS
//! - LEADER_UNTRUSTED_MATERIAL
//! - LEADER_CERTIFICATE_FAILED
//! - LEADER_BOOTSTRAP_FAILED
//! - LEADER_MANIFEST_FAILED
//!
//! Every reconciliation error is terminal for the run.

use std::fmt;

use crate::certificate::CertError;

/// Reconciliation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileErrorCode {
    /// A fail-hard field did not validate
    InvalidField,
    /// Bootstrap token malformed or used in the wrong context
    InvalidToken,
    /// Operator supplied only part of a credential set
    IncompleteCredentials,
    /// Operator-supplied certificates exist but do not validate
    UntrustedMaterial,
    /// Self-managed certificate generation failed
    CertificateFailed,
    /// The bootstrap exchange or its self-check failed
    BootstrapFailed,
    /// The manifest could not be written
    ManifestFailed,
}

impl ReconcileErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidField => "LEADER_INVALID_FIELD",
            Self::InvalidToken => "LEADER_INVALID_TOKEN",
            Self::IncompleteCredentials => "LEADER_INCOMPLETE_CREDENTIALS",
            Self::UntrustedMaterial => "LEADER_UNTRUSTED_MATERIAL",
            Self::CertificateFailed => "LEADER_CERTIFICATE_FAILED",
            Self::BootstrapFailed => "LEADER_BOOTSTRAP_FAILED",
            Self::ManifestFailed => "LEADER_MANIFEST_FAILED",
        }
    }
}

impl fmt::Display for ReconcileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Reconciliation error
#[derive(Debug)]
pub struct ReconcileError {
    code: ReconcileErrorCode,
    message: String,
}

impl ReconcileError {
    pub fn new(code: ReconcileErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_field(field: &str, value: &str) -> Self {
        Self::new(
            ReconcileErrorCode::InvalidField,
            format!("invalid value '{}' for {}", value, field),
        )
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::new(ReconcileErrorCode::InvalidToken, msg)
    }

    pub fn incomplete_credentials(msg: impl Into<String>) -> Self {
        Self::new(ReconcileErrorCode::IncompleteCredentials, msg)
    }

    pub fn untrusted_material(msg: impl Into<String>) -> Self {
        Self::new(ReconcileErrorCode::UntrustedMaterial, msg)
    }

    pub fn certificate_failed(msg: impl Into<String>) -> Self {
        Self::new(ReconcileErrorCode::CertificateFailed, msg)
    }

    pub fn bootstrap_failed(msg: impl Into<String>) -> Self {
        Self::new(ReconcileErrorCode::BootstrapFailed, msg)
    }

    pub fn manifest_failed(msg: impl Into<String>) -> Self {
        Self::new(ReconcileErrorCode::ManifestFailed, msg)
    }

    pub fn code(&self) -> ReconcileErrorCode {
        self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for ReconcileError {}

impl From<CertError> for ReconcileError {
    fn from(e: CertError) -> Self {
        Self::certificate_failed(e.to_string())
    }
}

/// Reconciliation result type
pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = ReconcileError::invalid_token("error network token format");
        assert_eq!(
            err.to_string(),
            "LEADER_INVALID_TOKEN: error network token format"
        );
    }

    #[test]
    fn test_cert_error_converts_to_certificate_failed() {
        let err: ReconcileError = CertError::KeyGeneration("no entropy".to_string()).into();
        assert_eq!(err.code(), ReconcileErrorCode::CertificateFailed);
        assert!(err.message().contains("no entropy"));
    }
}
