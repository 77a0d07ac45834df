//! The field → validator → on-failure table

/// Validator applied to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// IPv4 or IPv6 literal
    IpAddr,
    /// Integer in 1..=65535
    Port,
    /// `addr/prefix`
    Cidr,
    /// `min-max` with a span over 100
    NodePortRange,
    /// 16 characters, not the local sentinel
    BootstrapToken,
}

/// What happens when a field fails its check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Substitute the subsystem default and continue (fail-soft)
    UseDefault,
    /// Abort the run (fail-hard)
    Abort,
}

/// One row of the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub check: Check,
    pub on_failure: OnFailure,
}

const fn soft(field: &'static str, check: Check) -> FieldRule {
    FieldRule {
        field,
        check,
        on_failure: OnFailure::UseDefault,
    }
}

const fn hard(field: &'static str, check: Check) -> FieldRule {
    FieldRule {
        field,
        check,
        on_failure: OnFailure::Abort,
    }
}

pub const FIELD_RULES: &[FieldRule] = &[
    soft("kine.bind-address", Check::IpAddr),
    soft("kine.secure-port", Check::Port),
    soft("network-manager.register.address", Check::IpAddr),
    soft("network-manager.register.secure-port", Check::Port),
    soft("network-manager.join.address", Check::IpAddr),
    soft("network-manager.join.secure-port", Check::Port),
    hard("network-manager.token", Check::BootstrapToken),
    soft("apiserver.service-cluster-ip-range", Check::Cidr),
    soft("apiserver.service-node-port-range", Check::NodePortRange),
    soft("apiserver.secure-port", Check::Port),
];

/// Look up the rule for a field.
pub fn rule(field: &str) -> Option<&'static FieldRule> {
    FIELD_RULES.iter().find(|r| r.field == field)
}
