//! Detached process launching.

use std::io;
use std::process::Stdio;

use droidrig_core::ProcessLauncher;
use tokio::process::Command;
use tracing::info;

/// Spawns processes that outlive the handle.
///
/// The child is moved into its own process group (Unix) so terminal signals
/// aimed at the orchestrator do not reach it, and its output is discarded.
/// Tokio reaps it in the background once it exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedLauncher;

impl DetachedLauncher {
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for DetachedLauncher {
    fn spawn_detached(&self, argv: &[String]) -> io::Result<u32> {
        let Some((program, args)) = argv.split_first() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty command line"));
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false);

        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn()?;
        let pid = child.id().unwrap_or_default();
        info!(command = %argv.join(" "), pid, "Launched detached process");
        Ok(pid)
    }
}
