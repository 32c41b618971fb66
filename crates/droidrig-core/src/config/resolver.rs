//! Capability and profile configuration resolution.
//!
//! # Capability files
//!
//! For `(platform, environment)` the resolver looks under
//! `<base>/config/capabilities/` for `<platform>-<environment>.json` first,
//! then `<platform>-<environment>.yaml`. Both names are lowercased.
//!
//! # Profiles
//!
//! `APPIUM_ENV` selects one of three JSON files under `<base>/config/`.
//! Profiles never fall back to YAML.
//!
//! Every call re-reads the files; nothing is cached.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::flatten::{flatten_document, parse_document};
use super::profile::{HOST_OVERRIDE_VAR, PORT_OVERRIDE_VAR, PROFILE_ENV_VAR, Profile};
use crate::domain::{CapabilitySet, CapabilityValue, SourceFormat};
use crate::error::{OrchestratorError, OrchestratorResult};

/// Directory (relative to the base) holding capability files.
pub const CAPABILITIES_DIR: &str = "config/capabilities";

/// Directory (relative to the base) holding profile files.
pub const PROFILES_DIR: &str = "config";

/// Environment lookup used for profile selection and overrides.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Replace `key` with the coerced value of `variable` when it is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverride {
    pub variable: String,
    pub key: String,
}

impl EnvOverride {
    pub fn new(variable: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            key: key.into(),
        }
    }
}

/// Resolves capability sets from layered, possibly-missing files.
#[derive(Clone)]
pub struct ConfigurationResolver {
    base_dir: PathBuf,
    capability_overrides: Vec<EnvOverride>,
    env: EnvLookup,
}

impl fmt::Debug for ConfigurationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationResolver")
            .field("base_dir", &self.base_dir)
            .field("capability_overrides", &self.capability_overrides)
            .finish_non_exhaustive()
    }
}

impl ConfigurationResolver {
    /// Create a resolver rooted at `base_dir`, reading the process environment.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            capability_overrides: Vec::new(),
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Substitute the environment lookup (used by tests and embedders).
    #[must_use]
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    /// Register an override applied to capability-file resolutions.
    #[must_use]
    pub fn with_override(mut self, variable: impl Into<String>, key: impl Into<String>) -> Self {
        self.capability_overrides
            .push(EnvOverride::new(variable, key));
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The two candidate paths for `(platform, environment)`, primary first.
    pub fn capability_paths(&self, platform: &str, environment: &str) -> (PathBuf, PathBuf) {
        let stem = format!(
            "{}-{}",
            platform.trim().to_lowercase(),
            environment.trim().to_lowercase()
        );
        let dir = self.base_dir.join(CAPABILITIES_DIR);
        (
            dir.join(format!("{stem}.{}", SourceFormat::Json.extension())),
            dir.join(format!("{stem}.{}", SourceFormat::Yaml.extension())),
        )
    }

    /// Resolve the capability set for `(platform, environment)`.
    ///
    /// The primary (JSON) file wins when present; otherwise the secondary
    /// (YAML) file is used. Registered overrides are applied last.
    pub fn resolve(&self, platform: &str, environment: &str) -> OrchestratorResult<CapabilitySet> {
        let (primary, secondary) = self.capability_paths(platform, environment);

        let (path, format) = if primary.is_file() {
            (primary, SourceFormat::Json)
        } else if secondary.is_file() {
            debug!(
                primary = %primary.display(),
                "Primary capability file absent, using secondary format"
            );
            (secondary, SourceFormat::Yaml)
        } else {
            return Err(OrchestratorError::ConfigNotFound {
                tried: vec![primary, secondary],
            });
        };

        let mut set = load_file(&path, format)?;
        self.apply_overrides(&mut set, &self.capability_overrides);

        info!(
            platform = %platform,
            environment = %environment,
            path = %path.display(),
            format = %format,
            entries = set.len(),
            "Resolved capabilities"
        );
        Ok(set)
    }

    /// Resolve the profile selected by `APPIUM_ENV`.
    pub fn resolve_profile(&self) -> OrchestratorResult<CapabilitySet> {
        let selector = (self.env)(PROFILE_ENV_VAR);
        self.resolve_named_profile(Profile::from_selector(selector.as_deref()))
    }

    /// Resolve a specific profile.
    ///
    /// `APPIUM_HOST` and `APPIUM_PORT` override `server.host` and
    /// `server.port` when set.
    pub fn resolve_named_profile(&self, profile: Profile) -> OrchestratorResult<CapabilitySet> {
        let path = self.profile_path(profile);
        if !path.is_file() {
            return Err(OrchestratorError::ConfigNotFound { tried: vec![path] });
        }

        let mut set = load_file(&path, SourceFormat::Json)?;
        let server_overrides = [
            EnvOverride::new(HOST_OVERRIDE_VAR, "server.host"),
            EnvOverride::new(PORT_OVERRIDE_VAR, "server.port"),
        ];
        self.apply_overrides(&mut set, &server_overrides);

        info!(
            profile = %profile,
            path = %path.display(),
            entries = set.len(),
            "Resolved profile configuration"
        );
        Ok(set)
    }

    pub fn profile_path(&self, profile: Profile) -> PathBuf {
        self.base_dir.join(PROFILES_DIR).join(profile.file_name())
    }

    fn apply_overrides(&self, set: &mut CapabilitySet, overrides: &[EnvOverride]) {
        for EnvOverride { variable, key } in overrides {
            if let Some(raw) = (self.env)(variable) {
                let value = CapabilityValue::coerce(raw.trim());
                debug!(variable = %variable, key = %key, value = %value, "Applying environment override");
                set.apply_override(key, value);
            }
        }
    }
}

fn load_file(path: &Path, format: SourceFormat) -> OrchestratorResult<CapabilitySet> {
    let text = fs::read_to_string(path).map_err(|e| OrchestratorError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let document = parse_document(&text, format, path)?;
    let entries = flatten_document(&document, path)?;
    Ok(CapabilitySet::new(entries, format, path))
}
