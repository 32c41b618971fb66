//! Terminating child processes.
//!
//! Two strategies:
//! - [`shutdown_child`]: SIGTERM, a grace period, then SIGKILL (long-running services)
//! - [`kill_tree`]: immediate SIGKILL of the child's process group (timed-out commands)

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
#[cfg(unix)]
use tokio::time::timeout;
#[cfg(unix)]
use tracing::debug;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Grace period between SIGTERM and SIGKILL.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Gracefully shut down a child process, escalating to SIGKILL if needed.
///
/// # Strategy
/// 1. Send SIGTERM and wait up to `grace` for the process to exit
/// 2. If still running, send SIGKILL
/// 3. Wait for reaping (required to avoid zombies)
///
/// On Windows there is no SIGTERM equivalent, so the process is killed
/// immediately.
pub async fn shutdown_child(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) else {
            // Already reaped
            return child.wait().await;
        };

        if let Err(e) = signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
            if e == nix::errno::Errno::ESRCH {
                return child.wait().await;
            }
            return Err(io::Error::other(e));
        }

        if let Ok(result) = timeout(grace, child.wait()).await {
            return result;
        }
        debug!(pid, "Process ignored SIGTERM, escalating to SIGKILL");
    }

    #[cfg(not(unix))]
    let _ = grace;

    child.kill().await?;
    child.wait().await
}

/// Kill a child and, on Unix, every process in its process group.
///
/// The child must have been spawned as a group leader (`process_group(0)`).
/// Killing the group is best-effort; the direct child is always killed and
/// reaped.
pub async fn kill_tree(child: &mut Child) -> io::Result<()> {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) {
            if let Err(e) = signal::killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                debug!(pid, error = %e, "Process group kill failed");
            }
        }
    }

    // Sends SIGKILL (if still needed) and reaps
    child.kill().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::process::Command;
    use tokio::time::sleep;

    #[tokio::test]
    #[cfg(unix)]
    async fn shutdown_responds_to_sigterm() {
        let mut child = Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("failed to spawn sleep");

        let status = shutdown_child(&mut child, DEFAULT_SHUTDOWN_GRACE)
            .await
            .unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn shutdown_escalates_when_sigterm_ignored() {
        let mut child = Command::new("sh")
            .args(["-c", "trap '' TERM; sleep 30"])
            .spawn()
            .expect("failed to spawn sh");
        // Let the shell install its trap
        sleep(Duration::from_millis(200)).await;

        let result = shutdown_child(&mut child, Duration::from_millis(300)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn shutdown_handles_already_exited() {
        let mut child = Command::new("echo")
            .arg("test")
            .spawn()
            .expect("failed to spawn echo");

        sleep(Duration::from_millis(100)).await;

        let result = shutdown_child(&mut child, DEFAULT_SHUTDOWN_GRACE).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn kill_tree_terminates_group_leader() {
        let mut child = Command::new("sleep")
            .arg("30")
            .process_group(0)
            .spawn()
            .expect("failed to spawn sleep");

        kill_tree(&mut child).await.unwrap();
        assert!(child.try_wait().unwrap().is_some());
    }
}
