//! Per-field validation policy
//!
//! Every operator field the reconcilers check is listed in [`FIELD_RULES`]
//! together with its validator and what happens when validation fails:
//! substitute the subsystem default and continue, or abort the run.
//! Reconcilers never decide that themselves; they call the typed resolvers
//! below, which look the policy up here.

mod rules;

pub use rules::{rule, Check, FieldRule, OnFailure, FIELD_RULES};

use std::net::IpAddr;

use crate::observability::{log_event_with_fields, Event};
use crate::options::{ApiServerDefaults, LOCAL_TOKEN, TOKEN_LEN};
use crate::reconcile::{ReconcileError, ReconcileResult};

/// Outcome of resolving one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    /// The operator's value, when it was rejected and replaced.
    pub rejected: Option<String>,
}

impl<T> Resolved<T> {
    fn accepted(value: T) -> Self {
        Self {
            value,
            rejected: None,
        }
    }

    /// Whether the operator's value was replaced by the default.
    pub fn was_overridden(&self) -> bool {
        self.rejected.is_some()
    }
}

/// Resolve an IP literal field.
pub fn ip_address(field: &str, raw: &str, default: &str) -> ReconcileResult<Resolved<String>> {
    let parsed = raw.parse::<IpAddr>().ok().map(|_| raw.to_string());
    settle(field, Check::IpAddr, raw, parsed, default.to_string())
}

/// Resolve a port field; valid ports are 1..=65535.
pub fn port(field: &str, raw: i64, default: u16) -> ReconcileResult<Resolved<u16>> {
    let parsed = u16::try_from(raw).ok().filter(|p| *p >= 1);
    settle(field, Check::Port, &raw.to_string(), parsed, default)
}

/// Resolve an address block (`addr/prefix`) field.
pub fn cidr(field: &str, raw: &str, default: &str) -> ReconcileResult<Resolved<String>> {
    let parsed = is_cidr(raw).then(|| raw.to_string());
    settle(field, Check::Cidr, raw, parsed, default.to_string())
}

/// Resolve a `min-max` node-port range field.
pub fn node_port_range(field: &str, raw: &str, default: &str) -> ReconcileResult<Resolved<String>> {
    let parsed = normalize_node_port_range(raw);
    settle(field, Check::NodePortRange, raw, parsed, default.to_string())
}

/// Check a bootstrap token presented as a credential for a remote membership
/// service. The local sentinel and any length other than 16 are rejected.
pub fn bootstrap_token(field: &str, raw: &str) -> ReconcileResult<String> {
    let on_failure = policy(field, Check::BootstrapToken)?;
    resolve_token(field, on_failure, raw).map(|resolved| resolved.value)
}

/// Tokens have no default: under a fail-soft rule a rejected token resolves
/// to the empty string.
fn resolve_token(field: &str, on_failure: OnFailure, raw: &str) -> ReconcileResult<Resolved<String>> {
    let problem = token_problem(raw);
    let parsed = problem.is_none().then(|| raw.to_string());
    apply(field, on_failure, raw, parsed, String::new(), || {
        ReconcileError::invalid_token(problem.unwrap_or_default())
    })
}

fn token_problem(raw: &str) -> Option<String> {
    if raw == LOCAL_TOKEN {
        return Some(format!(
            "bad token({}) to connect with network-manager, only allowed when the network manager runs in the leader process",
            LOCAL_TOKEN
        ));
    }
    let len = raw.chars().count();
    (len != TOKEN_LEN).then(|| {
        format!(
            "error network token format: expected {} characters, got {}",
            TOKEN_LEN, len
        )
    })
}

fn policy(field: &str, check: Check) -> ReconcileResult<OnFailure> {
    rule(field)
        .filter(|r| r.check == check)
        .map(|r| r.on_failure)
        .ok_or_else(|| ReconcileError::invalid_field(field, "<no validation rule>"))
}

fn settle<T>(
    field: &str,
    check: Check,
    raw: &str,
    parsed: Option<T>,
    default: T,
) -> ReconcileResult<Resolved<T>>
where
    T: ToString,
{
    let on_failure = policy(field, check)?;
    apply(field, on_failure, raw, parsed, default, || {
        ReconcileError::invalid_field(field, raw)
    })
}

fn apply<T>(
    field: &str,
    on_failure: OnFailure,
    raw: &str,
    parsed: Option<T>,
    default: T,
    abort: impl FnOnce() -> ReconcileError,
) -> ReconcileResult<Resolved<T>>
where
    T: ToString,
{
    if let Some(value) = parsed {
        return Ok(Resolved::accepted(value));
    }
    match on_failure {
        OnFailure::UseDefault => {
            // Unset fields take the default silently.
            if !raw.is_empty() && raw != "0" {
                let shown = default.to_string();
                log_event_with_fields(
                    Event::OptionOverridden,
                    &[
                        ("field", field),
                        ("rejected", raw),
                        ("value", shown.as_str()),
                    ],
                );
            }
            Ok(Resolved {
                value: default,
                rejected: Some(raw.to_string()),
            })
        }
        OnFailure::Abort => Err(abort()),
    }
}

fn is_cidr(raw: &str) -> bool {
    let Some((addr, prefix)) = raw.split_once('/') else {
        return false;
    };
    let Ok(addr) = addr.parse::<IpAddr>() else {
        return false;
    };
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    match addr {
        IpAddr::V4(_) => prefix <= 32,
        IpAddr::V6(_) => prefix <= 128,
    }
}

/// Parse `min-max`. An unparseable (or non-positive) lower bound becomes
/// 30000 and an unparseable upper bound becomes 65535; the range is kept only
/// if it is increasing and spans more than 100 ports.
fn normalize_node_port_range(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw.split('-').collect();
    if parts.len() != 2 {
        return None;
    }
    let min = parts[0]
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|p| *p > 0)
        .unwrap_or(ApiServerDefaults::NODE_PORT_MIN_FALLBACK);
    let max = parts[1]
        .trim()
        .parse::<i64>()
        .unwrap_or(ApiServerDefaults::NODE_PORT_MAX_FALLBACK);

    (max > min && max - min > ApiServerDefaults::NODE_PORT_MIN_SPAN)
        .then(|| format!("{}-{}", min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::ReconcileErrorCode;

    const KINE_PORT: &str = "kine.secure-port";
    const KINE_ADDR: &str = "kine.bind-address";

    #[test]
    fn test_port_bounds() {
        for p in [0, -1, 65536, 100000, i64::MIN] {
            let r = port(KINE_PORT, p, 2379).unwrap();
            assert_eq!(r.value, 2379, "port {} should default", p);
            assert!(r.was_overridden());
        }
        for p in [1, 80, 2379, 65535] {
            let r = port(KINE_PORT, p, 2379).unwrap();
            assert_eq!(i64::from(r.value), p);
            assert!(!r.was_overridden());
        }
    }

    #[test]
    fn test_ip_address() {
        assert_eq!(ip_address(KINE_ADDR, "10.1.2.3", "127.0.0.1").unwrap().value, "10.1.2.3");
        assert_eq!(ip_address(KINE_ADDR, "::1", "127.0.0.1").unwrap().value, "::1");
        for bad in ["", "localhost", "300.1.1.1", "10.0.0.1:80"] {
            let r = ip_address(KINE_ADDR, bad, "127.0.0.1").unwrap();
            assert_eq!(r.value, "127.0.0.1");
            assert_eq!(r.rejected.as_deref(), Some(bad));
        }
    }

    #[test]
    fn test_cidr() {
        let field = "apiserver.service-cluster-ip-range";
        assert_eq!(cidr(field, "10.96.0.0/12", "10.0.0.0/16").unwrap().value, "10.96.0.0/12");
        assert_eq!(cidr(field, "fd00::/108", "10.0.0.0/16").unwrap().value, "fd00::/108");
        for bad in [
            "",
            "10.96.0.0",
            "10.96.0.0/33",
            "nope/8",
            "10.96.0.0/x",
            "10.96.0.0/+12",
            "10.96.0.0/ 12",
            "10.96.0.0/",
        ] {
            assert_eq!(cidr(field, bad, "10.0.0.0/16").unwrap().value, "10.0.0.0/16");
        }
    }

    #[test]
    fn test_node_port_range_normalization() {
        assert_eq!(normalize_node_port_range("30100-90000").as_deref(), Some("30100-90000"));
        assert_eq!(normalize_node_port_range(" 30100 - 31000 ").as_deref(), Some("30100-31000"));
        assert_eq!(normalize_node_port_range("40000-40050"), None);
        assert_eq!(normalize_node_port_range("40000-40100"), None);
        assert_eq!(normalize_node_port_range("40000-40101").as_deref(), Some("40000-40101"));
        assert_eq!(normalize_node_port_range("x-31000").as_deref(), Some("30000-31000"));
        assert_eq!(normalize_node_port_range("0-31000").as_deref(), Some("30000-31000"));
        assert_eq!(normalize_node_port_range("31000-y").as_deref(), Some("31000-65535"));
        assert_eq!(normalize_node_port_range("32000-31000"), None);
        assert_eq!(normalize_node_port_range("30000"), None);
        assert_eq!(normalize_node_port_range("1-2-3"), None);
        assert_eq!(normalize_node_port_range(""), None);
    }

    #[test]
    fn test_bootstrap_token() {
        let field = "network-manager.token";
        assert_eq!(bootstrap_token(field, "abcdefgh12345678").unwrap(), "abcdefgh12345678");

        let err = bootstrap_token(field, "local").unwrap_err();
        assert_eq!(err.code(), ReconcileErrorCode::InvalidToken);
        assert!(err.message().contains("local"));

        for bad in ["", "short", "abcdefgh123456789"] {
            let err = bootstrap_token(field, bad).unwrap_err();
            assert_eq!(err.code(), ReconcileErrorCode::InvalidToken);
        }
    }

    #[test]
    fn test_token_failure_follows_policy() {
        let field = "network-manager.token";
        assert_eq!(rule(field).unwrap().on_failure, OnFailure::Abort);

        let err = resolve_token(field, OnFailure::Abort, "short").unwrap_err();
        assert_eq!(err.code(), ReconcileErrorCode::InvalidToken);
        assert!(err.message().contains("expected 16 characters"));

        let soft = resolve_token(field, OnFailure::UseDefault, "short").unwrap();
        assert_eq!(soft.value, "");
        assert_eq!(soft.rejected.as_deref(), Some("short"));

        let ok = resolve_token(field, OnFailure::UseDefault, "abcdefgh12345678").unwrap();
        assert!(!ok.was_overridden());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = port("kine.no-such-field", 80, 1).unwrap_err();
        assert_eq!(err.code(), ReconcileErrorCode::InvalidField);
    }

    #[test]
    fn test_check_kind_must_match_rule() {
        // kine.bind-address is an IP rule, not a port rule
        assert!(port(KINE_ADDR, 80, 1).is_err());
    }
}
