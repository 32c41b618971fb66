//! Settings domain types and validation.
//!
//! Every tunable the orchestrator needs, with defaults matching a local
//! Android workstation. Values can be layered from `DROIDRIG_*` variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::paths::DEFAULT_SDK_FALLBACK_SUFFIX;

pub const DEFAULT_BOOT_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SERVICE_EXECUTABLE: &str = "appium";
pub const DEFAULT_SERVICE_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVICE_PORT: u16 = 4723;
pub const DEFAULT_SERVICE_LOG_LEVEL: &str = "info";
pub const DEFAULT_SERVICE_STARTUP_TIMEOUT_SECS: u64 = 60;

pub const AVD_VAR: &str = "DROIDRIG_AVD";
pub const HEADLESS_VAR: &str = "DROIDRIG_HEADLESS";
pub const BOOT_TIMEOUT_VAR: &str = "DROIDRIG_BOOT_TIMEOUT";
pub const POLL_INTERVAL_VAR: &str = "DROIDRIG_POLL_INTERVAL";
pub const PROBE_TIMEOUT_VAR: &str = "DROIDRIG_PROBE_TIMEOUT";
pub const SERVICE_BIN_VAR: &str = "DROIDRIG_SERVICE_BIN";
pub const SERVICE_HOST_VAR: &str = "DROIDRIG_SERVICE_HOST";
pub const SERVICE_PORT_VAR: &str = "DROIDRIG_SERVICE_PORT";
pub const SERVICE_LOG_LEVEL_VAR: &str = "DROIDRIG_SERVICE_LOG_LEVEL";

/// Orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// AVD to boot. Required by commands that launch an emulator.
    pub avd_name: Option<String>,

    /// Run the emulator without a window (ignored on Windows).
    pub headless: bool,

    pub boot_timeout_secs: u64,
    pub poll_interval_secs: u64,

    /// Per-probe timeout while waiting for boot.
    pub probe_timeout_secs: u64,

    /// Program used to launch the driver server.
    pub service_executable: String,
    pub service_host: String,
    pub service_port: u16,
    pub session_override: bool,
    pub service_log_level: String,

    /// How long to wait for the server's status endpoint. `0` disables the
    /// readiness check.
    pub service_startup_timeout_secs: u64,

    /// Appended to the home directory when no SDK variable is set.
    pub sdk_fallback_suffix: String,

    /// Base directory containing `config/`.
    pub resource_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            avd_name: None,
            headless: false,
            boot_timeout_secs: DEFAULT_BOOT_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            service_executable: DEFAULT_SERVICE_EXECUTABLE.to_string(),
            service_host: DEFAULT_SERVICE_HOST.to_string(),
            service_port: DEFAULT_SERVICE_PORT,
            session_override: true,
            service_log_level: DEFAULT_SERVICE_LOG_LEVEL.to_string(),
            service_startup_timeout_secs: DEFAULT_SERVICE_STARTUP_TIMEOUT_SECS,
            sdk_fallback_suffix: DEFAULT_SDK_FALLBACK_SUFFIX.to_string(),
            resource_dir: None,
        }
    }
}

impl Settings {
    /// Defaults overlaid with `DROIDRIG_*` variables from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values from `lookup`. Empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut settings = Self::default();

        if let Some(avd) = get(AVD_VAR) {
            settings.avd_name = Some(avd);
        }
        if let Some(raw) = get(HEADLESS_VAR) {
            settings.headless = parse_bool(HEADLESS_VAR, &raw)?;
        }
        if let Some(raw) = get(BOOT_TIMEOUT_VAR) {
            settings.boot_timeout_secs = parse_number(BOOT_TIMEOUT_VAR, &raw)?;
        }
        if let Some(raw) = get(POLL_INTERVAL_VAR) {
            settings.poll_interval_secs = parse_number(POLL_INTERVAL_VAR, &raw)?;
        }
        if let Some(raw) = get(PROBE_TIMEOUT_VAR) {
            settings.probe_timeout_secs = parse_number(PROBE_TIMEOUT_VAR, &raw)?;
        }
        if let Some(bin) = get(SERVICE_BIN_VAR) {
            settings.service_executable = bin;
        }
        if let Some(host) = get(SERVICE_HOST_VAR) {
            settings.service_host = host;
        }
        if let Some(raw) = get(SERVICE_PORT_VAR) {
            settings.service_port = parse_number(SERVICE_PORT_VAR, &raw)?;
        }
        if let Some(level) = get(SERVICE_LOG_LEVEL_VAR) {
            settings.service_log_level = level;
        }
        if let Some(dir) = get(crate::paths::RESOURCE_DIR_VAR) {
            settings.resource_dir = Some(PathBuf::from(dir));
        }

        Ok(settings)
    }

    pub const fn boot_timeout(&self) -> Duration {
        Duration::from_secs(self.boot_timeout_secs)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// `None` when the readiness check is disabled.
    pub const fn service_startup_timeout(&self) -> Option<Duration> {
        match self.service_startup_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{variable} must be {expected}, got '{value}'")]
    InvalidValue {
        variable: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Probe timeout ({probe}s) must be shorter than the boot timeout ({boot}s)")]
    ProbeExceedsBoot { probe: u64, boot: u64 },

    #[error("Service port must be non-zero")]
    InvalidPort,

    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if settings.boot_timeout_secs == 0 {
        return Err(SettingsError::ZeroDuration("boot_timeout_secs"));
    }
    if settings.poll_interval_secs == 0 {
        return Err(SettingsError::ZeroDuration("poll_interval_secs"));
    }
    if settings.probe_timeout_secs == 0 {
        return Err(SettingsError::ZeroDuration("probe_timeout_secs"));
    }
    if settings.probe_timeout_secs >= settings.boot_timeout_secs {
        return Err(SettingsError::ProbeExceedsBoot {
            probe: settings.probe_timeout_secs,
            boot: settings.boot_timeout_secs,
        });
    }

    if settings.service_port == 0 {
        return Err(SettingsError::InvalidPort);
    }
    if settings.service_executable.trim().is_empty() {
        return Err(SettingsError::Empty("service_executable"));
    }
    if settings.service_host.trim().is_empty() {
        return Err(SettingsError::Empty("service_host"));
    }

    if settings
        .avd_name
        .as_ref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(SettingsError::Empty("avd_name"));
    }

    Ok(())
}

fn parse_bool(variable: &'static str, raw: &str) -> Result<bool, SettingsError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            variable,
            expected: "a boolean",
            value: raw.to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(
    variable: &'static str,
    raw: &str,
) -> Result<T, SettingsError> {
    raw.parse().map_err(|_| SettingsError::InvalidValue {
        variable,
        expected: "a non-negative integer",
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.boot_timeout(), Duration::from_secs(180));
        assert_eq!(settings.poll_interval(), Duration::from_secs(5));
        assert_eq!(settings.probe_timeout(), Duration::from_secs(10));
        assert_eq!(settings.service_port, 4723);
        assert!(settings.session_override);
        assert!(!settings.headless);
        assert_eq!(settings.avd_name, None);
        assert_eq!(
            settings.service_startup_timeout(),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_validate_settings_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_from_lookup_overrides_defaults() {
        let settings = Settings::from_lookup(lookup(&[
            (AVD_VAR, "Pixel_7_API_34"),
            (HEADLESS_VAR, "yes"),
            (BOOT_TIMEOUT_VAR, "300"),
            (SERVICE_PORT_VAR, "4800"),
            (SERVICE_BIN_VAR, "  "),
        ]))
        .unwrap();

        assert_eq!(settings.avd_name.as_deref(), Some("Pixel_7_API_34"));
        assert!(settings.headless);
        assert_eq!(settings.boot_timeout_secs, 300);
        assert_eq!(settings.service_port, 4800);
        // Blank values are ignored
        assert_eq!(settings.service_executable, DEFAULT_SERVICE_EXECUTABLE);
    }

    #[test]
    fn test_from_lookup_rejects_malformed_number() {
        let err = Settings::from_lookup(lookup(&[(SERVICE_PORT_VAR, "http")])).unwrap_err();
        assert!(err.to_string().contains(SERVICE_PORT_VAR));
    }

    #[test]
    fn test_from_lookup_rejects_malformed_bool() {
        let err = Settings::from_lookup(lookup(&[(HEADLESS_VAR, "maybe")])).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidValue {
                variable: HEADLESS_VAR,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_zero_poll_interval() {
        let settings = Settings {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::ZeroDuration("poll_interval_secs"))
        ));
    }

    #[test]
    fn test_validate_probe_longer_than_boot() {
        let settings = Settings {
            boot_timeout_secs: 10,
            probe_timeout_secs: 10,
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::ProbeExceedsBoot { probe: 10, boot: 10 })
        ));
    }

    #[test]
    fn test_validate_zero_port() {
        let settings = Settings {
            service_port: 0,
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidPort)
        ));
    }

    #[test]
    fn test_zero_startup_timeout_disables_readiness() {
        let settings = Settings {
            service_startup_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(settings.service_startup_timeout(), None);
    }
}
