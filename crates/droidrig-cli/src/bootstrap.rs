//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where concrete implementations are wired
//! together for the CLI:
//! - Command runner and detached launcher (via droidrig-runtime)
//! - SDK location and tool paths (via droidrig-core)
//! - Configuration resolver (via droidrig-core)
//!
//! Handlers receive a `CliContext` and build controllers from it.

use std::path::PathBuf;
use std::sync::Arc;

use droidrig_core::{
    CommandRunner, ConfigurationResolver, ProcessLauncher, SdkLocation, Settings,
    resolve_android_sdk, resource_root, validate_settings,
};
use droidrig_runtime::{
    AvailabilityChecker, CommandExecutor, DetachedLauncher, EmulatorConfig, EmulatorController,
    EmulatorTools, ServiceConfig, ServiceController,
};
use tracing::debug;

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Settings after environment and global flags are applied.
    pub settings: Settings,
}

impl CliConfig {
    /// Settings from `DROIDRIG_*` variables, then the `--resource-dir` flag.
    pub fn from_env(resource_dir: Option<PathBuf>) -> Result<Self, CliError> {
        let mut settings = Settings::from_env()?;
        if resource_dir.is_some() {
            settings.resource_dir = resource_dir;
        }
        Ok(Self { settings })
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    settings: Settings,
    sdk: SdkLocation,
    tools: EmulatorTools,
    runner: Arc<dyn CommandRunner>,
    launcher: Arc<dyn ProcessLauncher>,
}

impl CliContext {
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub const fn sdk(&self) -> &SdkLocation {
        &self.sdk
    }

    pub const fn tools(&self) -> &EmulatorTools {
        &self.tools
    }

    pub fn availability(&self) -> AvailabilityChecker {
        AvailabilityChecker::new(Arc::clone(&self.runner))
    }

    pub fn emulator(&self, config: EmulatorConfig) -> EmulatorController {
        EmulatorController::new(
            config,
            self.tools.clone(),
            Arc::clone(&self.runner),
            Arc::clone(&self.launcher),
        )
    }

    pub fn service(&self) -> ServiceController {
        ServiceController::new(
            ServiceConfig::from_settings(&self.settings),
            Arc::clone(&self.runner),
        )
    }

    /// Directory containing `config/`.
    pub fn resource_dir(&self) -> Result<PathBuf, CliError> {
        Ok(resource_root(self.settings.resource_dir.as_deref())?)
    }

    pub fn resolver(&self) -> Result<ConfigurationResolver, CliError> {
        Ok(ConfigurationResolver::new(self.resource_dir()?))
    }
}

/// Compose the CLI context.
///
/// # Errors
///
/// Returns `CliError::Config` if the settings are invalid.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    validate_settings(&config.settings)?;

    let sdk = resolve_android_sdk(&config.settings.sdk_fallback_suffix);
    let tools = EmulatorTools::from_sdk(&sdk.path);
    debug!(
        emulator = %tools.emulator.display(),
        adb = %tools.adb.display(),
        "Resolved SDK tools"
    );

    Ok(CliContext {
        settings: config.settings,
        sdk,
        tools,
        runner: Arc::new(CommandExecutor::new()),
        launcher: Arc::new(DetachedLauncher::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bootstrap_rejects_invalid_settings() {
        let config = CliConfig {
            settings: Settings {
                boot_timeout_secs: 0,
                ..Default::default()
            },
        };
        let err = bootstrap(config).err().unwrap();
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn test_explicit_resource_dir_is_used() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig {
            settings: Settings {
                resource_dir: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
        };
        let ctx = bootstrap(config).unwrap();
        assert_eq!(ctx.resource_dir().unwrap(), dir.path());
        assert_eq!(ctx.resolver().unwrap().base_dir(), dir.path());
    }

    #[test]
    fn test_missing_resource_dir_is_config_error() {
        let config = CliConfig {
            settings: Settings {
                resource_dir: Some(PathBuf::from("/definitely/not/a/droidrig/dir")),
                ..Default::default()
            },
        };
        let ctx = bootstrap(config).unwrap();
        assert_eq!(ctx.resource_dir().unwrap_err().exit_code(), 78);
    }
}
