//! Bounded execution of external commands.
//!
//! Each call spawns one process with stdout and stderr piped into a shared
//! channel, so output is consumed while the process runs and a chatty child
//! can never block on a full pipe. The deadline races process completion;
//! when it wins the whole process group is killed.

use std::io;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use droidrig_core::{CommandResult, CommandRunner, CommandSpec, OrchestratorError, OrchestratorResult};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::process::kill_tree;
use crate::process::stream::spawn_line_collector;

/// How long to keep draining output after the process has gone.
///
/// A grandchild that inherited the pipes could otherwise hold the call open.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Runs commands as real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandExecutor;

impl CommandExecutor {
    pub const fn new() -> Self {
        Self
    }

    async fn run(spec: &CommandSpec) -> OrchestratorResult<CommandResult> {
        let Some(program) = spec.program() else {
            return Err(OrchestratorError::ExecutableNotFound {
                program: String::new(),
            });
        };
        let command_line = spec.to_string();

        let mut cmd = Command::new(program);
        cmd.args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so a timeout can take down the whole tree
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| spawn_error(program, &command_line, e))?;
        debug!(
            command = %command_line,
            pid = ?child.id(),
            timeout_ms = spec.timeout.as_millis(),
            "Spawned command"
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_line_collector(stdout, "stdout", tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_line_collector(stderr, "stderr", tx));
        }

        let (exit_code, timed_out) = match timeout(spec.timeout, child.wait()).await {
            Ok(Ok(status)) => (status.code(), false),
            Ok(Err(source)) => {
                return Err(OrchestratorError::CommandSpawn {
                    command: command_line,
                    source,
                });
            }
            Err(_) => {
                if let Err(e) = kill_tree(&mut child).await {
                    warn!(command = %command_line, error = %e, "Failed to kill timed-out command");
                }
                (None, true)
            }
        };

        for reader in readers {
            let abort = reader.abort_handle();
            if timeout(OUTPUT_DRAIN_GRACE, reader).await.is_err() {
                debug!(command = %command_line, "Output still open after exit, abandoning reader");
                abort.abort();
            }
        }

        let mut combined_output = String::new();
        while let Ok(line) = rx.try_recv() {
            combined_output.push_str(&line);
            combined_output.push('\n');
        }

        if timed_out {
            warn!(
                command = %command_line,
                timeout_ms = spec.timeout.as_millis(),
                "Command timed out and was killed"
            );
            Ok(CommandResult::timed_out(combined_output))
        } else {
            debug!(command = %command_line, exit_code = ?exit_code, "Command finished");
            Ok(CommandResult::exited(combined_output, exit_code))
        }
    }
}

#[async_trait]
impl CommandRunner for CommandExecutor {
    async fn execute(&self, spec: &CommandSpec) -> OrchestratorResult<CommandResult> {
        Self::run(spec).await
    }
}

fn spawn_error(program: &str, command_line: &str, source: io::Error) -> OrchestratorError {
    match source.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            OrchestratorError::ExecutableNotFound {
                program: program.to_string(),
            }
        }
        _ => OrchestratorError::CommandSpawn {
            command: command_line.to_string(),
            source,
        },
    }
}
