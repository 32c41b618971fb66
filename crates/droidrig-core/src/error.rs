//! Error taxonomy for environment orchestration.
//!
//! Only hard failures live here. Expected conditions (a probe timing out,
//! a non-zero exit, a boot deadline elapsing) are reported as status values
//! on `CommandResult` and `BootStatus` so callers can choose their own retry
//! policy.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the orchestrator to its caller.
///
/// Every variant names the path, command, or key that was tried so that a
/// misconfiguration can be diagnosed from the message alone.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The program is neither on `PATH` nor an existing executable path.
    #[error("Executable not found or not executable: {program}")]
    ExecutableNotFound { program: String },

    /// The OS refused to spawn a command (or reading its output failed).
    #[error("Failed to run `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The emulator process could not be launched.
    #[error("Failed to launch emulator with `{command}`: {reason}")]
    EmulatorLaunchFailed { command: String, reason: String },

    /// `start` was called on a controller that already left `NotStarted`.
    #[error("Emulator for AVD '{avd}' was already started by this controller")]
    EmulatorAlreadyStarted { avd: String },

    /// The auxiliary service process failed to spawn or never became ready.
    #[error("Failed to start service with `{command}`: {reason}")]
    ServiceStartFailed { command: String, reason: String },

    /// None of the candidate configuration files exists.
    #[error("No configuration found; tried {}", display_paths(tried))]
    ConfigNotFound { tried: Vec<PathBuf> },

    /// A configuration file exists but could not be read or parsed.
    #[error("Failed to parse configuration {}: {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    /// A leaf value cannot be represented by any `CapabilityValue` variant.
    #[error("Capability '{key}' has an unsupported value: {reason}")]
    InvalidCapabilityType { key: String, reason: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Convenience alias used across the workspace.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
