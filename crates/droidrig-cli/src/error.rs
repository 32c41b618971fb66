//! CLI-specific error types and mappings.
//!
//! Maps orchestrator and settings failures to exit codes and user-facing
//! messages.

use droidrig_core::{OrchestratorError, PathError, SettingsError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Orchestration error with no more specific category.
    #[error("{0}")]
    Core(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (spawn failure, unreadable pipe, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Process execution error.
    #[error("Process error: {0}")]
    Process(String),

    /// A deadline elapsed; retrying may succeed.
    #[error("Timed out: {0}")]
    Timeout(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Core(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Process(_) => 71,  // EX_OSERR
            Self::Io(_) => 74,       // EX_IOERR
            Self::Timeout(_) => 75,  // EX_TEMPFAIL
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<OrchestratorError> for CliError {
    fn from(err: OrchestratorError) -> Self {
        let message = err.to_string();
        match err {
            OrchestratorError::ExecutableNotFound { .. }
            | OrchestratorError::EmulatorLaunchFailed { .. }
            | OrchestratorError::ServiceStartFailed { .. } => Self::Process(message),
            OrchestratorError::CommandSpawn { .. } => Self::Io(message),
            OrchestratorError::ConfigNotFound { .. }
            | OrchestratorError::ConfigParse { .. }
            | OrchestratorError::InvalidCapabilityType { .. } => Self::Config(message),
            OrchestratorError::EmulatorAlreadyStarted { .. } => Self::Core(message),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Exit code for an error returned from a handler.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CliError>()
        .map_or(1, CliError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_config_errors_map_to_ex_config() {
        let err: CliError = OrchestratorError::ConfigNotFound {
            tried: vec![PathBuf::from("config/capabilities/android-dev.json")],
        }
        .into();
        assert_eq!(err.exit_code(), 78);
        assert!(err.to_string().contains("android-dev.json"));
    }

    #[test]
    fn test_missing_executable_is_process_error() {
        let err: CliError = OrchestratorError::ExecutableNotFound {
            program: "appium".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), 71);
    }

    #[test]
    fn test_exit_code_for_anyhow() {
        let err = anyhow::Error::new(CliError::Timeout("boot".to_string()));
        assert_eq!(exit_code_for(&err), 75);
        assert_eq!(exit_code_for(&anyhow::anyhow!("other")), 1);
    }
}
