//! Core types for droidrig: domain values, the error taxonomy, the
//! `CommandRunner` port, SDK path resolution, settings, and capability
//! configuration resolution.
//!
//! Nothing in this crate spawns processes; see `droidrig-runtime`.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod error;
pub mod paths;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use config::{ConfigurationResolver, EnvOverride, Profile, ServerTarget};
pub use domain::{
    BootStatus, CapabilitySet, CapabilityValue, CommandResult, CommandSpec, CommandStatus,
    Provenance, ServiceEndpoint, ServiceState, SourceFormat,
};
pub use error::{OrchestratorError, OrchestratorResult};
pub use paths::{
    DEFAULT_SDK_FALLBACK_SUFFIX, PathError, SdkLocation, SdkSource, emulator_executable,
    path_search_utility, resolve_android_sdk, resolve_sdk_location, resource_root,
    sdk_adb_executable,
};
pub use ports::{CommandRunner, ProcessLauncher};
#[cfg(feature = "mock")]
pub use ports::{MockCommandRunner, MockProcessLauncher};
pub use settings::{Settings, SettingsError, validate_settings};
