//! Leader options
//!
//! Two mirrored trees:
//! - [`RawOptions`]: what the operator supplied. Every field defaults, so a
//!   partially filled (or empty) options file deserializes.
//! - [`EffectiveOptions`]: what the rest of the system trusts. Built only from
//!   successful reconciler returns and persisted as the startup manifest.

mod apiserver;
mod errors;
mod global;
mod kine;
mod network;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use apiserver::{ApiServerDefaults, EffectiveApiServer, RawApiServer};
pub use errors::{OptionsError, OptionsResult};
pub use global::{default_work_dir, EffectiveGlobal, RawGlobal};
pub(crate) use global::manifest_path;
pub use kine::{EffectiveKine, KineDefaults, RawKine};
pub use network::{
    EffectiveEndpoint, EffectiveNetworkManager, EndpointDefaults, RawEndpoint, RawNetworkManager,
    JOIN_DEFAULTS, LOCAL_TOKEN, REGISTER_DEFAULTS, TOKEN_LEN,
};

/// Operator-supplied configuration, one fragment per subsystem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawOptions {
    pub global: RawGlobal,
    pub kine: RawKine,
    #[serde(rename = "network-manager")]
    pub network_manager: RawNetworkManager,
    pub apiserver: RawApiServer,
}

impl RawOptions {
    /// Load raw options from a YAML file.
    pub fn load(path: &Path) -> OptionsResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| OptionsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse raw options from YAML text. Empty text yields empty options.
    pub fn from_yaml(content: &str) -> OptionsResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

/// The validated, defaulted configuration produced by a full reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveOptions {
    pub global: EffectiveGlobal,
    /// Absent when the embedded storage backend does not run.
    pub kine: Option<EffectiveKine>,
    #[serde(rename = "network-manager")]
    pub network_manager: EffectiveNetworkManager,
    pub apiserver: EffectiveApiServer,
}

impl EffectiveOptions {
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(RawOptions::from_yaml("").unwrap(), RawOptions::default());
        assert_eq!(RawOptions::from_yaml("  \n").unwrap(), RawOptions::default());
    }

    #[test]
    fn test_partial_yaml() {
        let raw = RawOptions::from_yaml(
            "global:\n  work-dir: /tmp/x\nkine:\n  secure-port: 70000\n",
        )
        .unwrap();
        assert_eq!(raw.global.work_dir, "/tmp/x");
        assert_eq!(raw.kine.secure_port, 70000);
        assert_eq!(raw.kine.bind_address, "");
        assert_eq!(raw.network_manager.token, "");
    }

    #[test]
    fn test_negative_port_deserializes() {
        let raw = RawOptions::from_yaml("apiserver:\n  secure-port: -1\n").unwrap();
        assert_eq!(raw.apiserver.secure_port, -1);
    }

    #[test]
    fn test_nested_network_manager_yaml() {
        let raw = RawOptions::from_yaml(
            "network-manager:\n  token: abcdefgh12345678\n  register:\n    address: 10.0.0.5\n    secure-port: 6440\n",
        )
        .unwrap();
        assert_eq!(raw.network_manager.token, "abcdefgh12345678");
        assert_eq!(raw.network_manager.register.address, "10.0.0.5");
        assert_eq!(raw.network_manager.register.secure_port, 6440);
        assert_eq!(raw.network_manager.join.address, "");
    }

    #[test]
    fn test_invalid_yaml_reports_error() {
        let err = RawOptions::from_yaml("kine: [unclosed").unwrap_err();
        assert!(matches!(err, OptionsError::Parse(_)));
        assert!(err.to_string().starts_with("invalid options YAML"));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = RawOptions::load(Path::new("/nonexistent/leader.yaml")).unwrap_err();
        assert!(matches!(err, OptionsError::Read { .. }));
    }
}
