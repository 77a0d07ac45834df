//! Observable events of a reconciliation run
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Run lifecycle
    /// Reconciliation run begins
    ReconcileStart,
    /// Every reconciler succeeded and the manifest is on disk
    ReconcileComplete,
    /// Run aborted
    ReconcileFailed,

    // Global
    /// Embedded storage forced on (no external endpoint)
    KineForced,

    // Field policy
    /// Operator value replaced by a default
    OptionOverridden,

    // Storage backend
    /// Storage reconciler skipped
    KineSkipped,
    /// Self-managed storage certificates in use
    KineSelfManaged,
    /// Operator storage certificates accepted
    KineOperatorSupplied,

    // Membership
    /// Embedded membership server material in use
    MembershipHosted,
    /// Bootstrap exchange started
    BootstrapExchange,
    /// Previously fetched bootstrap material reused
    BootstrapReused,
    /// Bootstrap material fetched and checked
    BootstrapComplete,
    /// Operator membership credentials accepted
    MembershipOperatorSupplied,

    // Certificates
    /// Certificate set generated on disk
    CertificatesGenerated,
    /// Existing certificate set reused
    CertificatesReused,

    // Manifest
    /// Manifest written
    ManifestWritten,
}

impl Event {
    /// Returns the string representation used as the `event` key
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ReconcileStart => "RECONCILE_START",
            Event::ReconcileComplete => "RECONCILE_COMPLETE",
            Event::ReconcileFailed => "RECONCILE_FAILED",
            Event::KineForced => "KINE_FORCED",
            Event::OptionOverridden => "OPTION_OVERRIDDEN",
            Event::KineSkipped => "KINE_SKIPPED",
            Event::KineSelfManaged => "KINE_SELF_MANAGED",
            Event::KineOperatorSupplied => "KINE_OPERATOR_SUPPLIED",
            Event::MembershipHosted => "MEMBERSHIP_HOSTED",
            Event::BootstrapExchange => "BOOTSTRAP_EXCHANGE",
            Event::BootstrapReused => "BOOTSTRAP_REUSED",
            Event::BootstrapComplete => "BOOTSTRAP_COMPLETE",
            Event::MembershipOperatorSupplied => "MEMBERSHIP_OPERATOR_SUPPLIED",
            Event::CertificatesGenerated => "CERTIFICATES_GENERATED",
            Event::CertificatesReused => "CERTIFICATES_REUSED",
            Event::ManifestWritten => "MANIFEST_WRITTEN",
        }
    }

    /// Whether this event signals an abort
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::ReconcileFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
