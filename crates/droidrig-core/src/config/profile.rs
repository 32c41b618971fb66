//! Environment profiles and the driver-server target they describe.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{CapabilitySet, CapabilityValue};

/// Variable selecting the configuration profile.
pub const PROFILE_ENV_VAR: &str = "APPIUM_ENV";

/// Variable overriding `server.host` in profile configuration.
pub const HOST_OVERRIDE_VAR: &str = "APPIUM_HOST";

/// Variable overriding `server.port` in profile configuration.
pub const PORT_OVERRIDE_VAR: &str = "APPIUM_PORT";

pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 4723;

/// A named configuration profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Local,
    Staging,
    Production,
}

impl Profile {
    /// Map the selection variable's value to a profile.
    ///
    /// Unset or unrecognised values select `Local`; unrecognised ones are
    /// logged since they usually indicate a typo.
    pub fn from_selector(value: Option<&str>) -> Self {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::Local;
        };

        match raw.to_ascii_lowercase().as_str() {
            "staging" => Self::Staging,
            "production" => Self::Production,
            "local" => Self::Local,
            other => {
                warn!(
                    value = %other,
                    variable = PROFILE_ENV_VAR,
                    "Unknown profile, using local"
                );
                Self::Local
            }
        }
    }

    /// File name under `config/`.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Local => "appium.config.json",
            Self::Staging => "appium.config.staging.json",
            Self::Production => "appium.config.production.json",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Local => "local",
            Self::Staging => "staging",
            Self::Production => "production",
        };
        f.write_str(s)
    }
}

/// Host and port of the driver server a session should connect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTarget {
    pub host: String,
    pub port: u16,
}

impl ServerTarget {
    /// Read `server.host` / `server.port`, defaulting each independently.
    ///
    /// A port that is not an integer in `1..=65535` falls back to the
    /// default rather than failing.
    pub fn from_capabilities(set: &CapabilitySet) -> Self {
        let host = match set.get("server.host") {
            Some(value) => value.to_string(),
            None => DEFAULT_SERVER_HOST.to_string(),
        };

        let port = set
            .get("server.port")
            .and_then(CapabilityValue::as_int)
            .and_then(|p| u16::try_from(p).ok())
            .filter(|p| *p != 0)
            .unwrap_or(DEFAULT_SERVER_PORT);

        Self { host, port }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for ServerTarget {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceFormat;
    use std::collections::BTreeMap;

    #[test]
    fn test_profile_selection() {
        assert_eq!(Profile::from_selector(None), Profile::Local);
        assert_eq!(Profile::from_selector(Some("")), Profile::Local);
        assert_eq!(Profile::from_selector(Some("staging")), Profile::Staging);
        assert_eq!(
            Profile::from_selector(Some("PRODUCTION")),
            Profile::Production
        );
        assert_eq!(Profile::from_selector(Some("qa")), Profile::Local);
    }

    #[test]
    fn test_profile_file_names() {
        assert_eq!(Profile::Local.file_name(), "appium.config.json");
        assert_eq!(Profile::Staging.file_name(), "appium.config.staging.json");
        assert_eq!(
            Profile::Production.file_name(),
            "appium.config.production.json"
        );
    }

    fn set_with(entries: &[(&str, CapabilityValue)]) -> CapabilitySet {
        let map: BTreeMap<String, CapabilityValue> = entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        CapabilitySet::new(map, SourceFormat::Json, "config/appium.config.json")
    }

    #[test]
    fn test_server_target_defaults() {
        let target = ServerTarget::from_capabilities(&set_with(&[]));
        assert_eq!(target, ServerTarget::default());
        assert_eq!(target.url(), "http://127.0.0.1:4723");
    }

    #[test]
    fn test_server_target_reads_values() {
        let target = ServerTarget::from_capabilities(&set_with(&[
            ("server.host", CapabilityValue::coerce("10.0.0.5")),
            ("server.port", CapabilityValue::Int(4800)),
        ]));
        assert_eq!(target.host, "10.0.0.5");
        assert_eq!(target.port, 4800);
    }

    #[test]
    fn test_server_target_bad_port_falls_back() {
        let target = ServerTarget::from_capabilities(&set_with(&[(
            "server.port",
            CapabilityValue::String("abc".to_string()),
        )]));
        assert_eq!(target.port, DEFAULT_SERVER_PORT);

        let target = ServerTarget::from_capabilities(&set_with(&[(
            "server.port",
            CapabilityValue::Int(70_000),
        )]));
        assert_eq!(target.port, DEFAULT_SERVER_PORT);
    }
}
