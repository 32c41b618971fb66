//! Port definitions (trait abstractions) for external systems.
//!
//! The runtime crate provides the real implementations; tests substitute
//! scripted ones (enable the `mock` feature for `MockCommandRunner` and
//! `MockProcessLauncher`).

use async_trait::async_trait;

use crate::domain::{CommandResult, CommandSpec};
use crate::error::OrchestratorResult;

/// Runs a bounded external command and reports what happened.
///
/// # Contract
///
/// - `Err(ExecutableNotFound)` when `argv[0]` cannot be located
/// - `Err(CommandSpawn)` for other spawn/read I/O failures
/// - timeouts and non-zero exits are `Ok` results, never errors
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, spec: &CommandSpec) -> OrchestratorResult<CommandResult>;
}

/// Starts a long-running process without waiting for it.
///
/// The launched process is not owned by the caller: it keeps running after
/// the launcher (and the caller) are dropped. Returns the OS process id.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ProcessLauncher: Send + Sync {
    fn spawn_detached(&self, argv: &[String]) -> std::io::Result<u32>;
}
