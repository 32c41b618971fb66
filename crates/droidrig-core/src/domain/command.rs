//! External command descriptions and their outcomes.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A command line plus the wall-clock budget it is allowed to consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program followed by its arguments. `argv[0]` is the program.
    pub argv: Vec<String>,
    /// Hard timeout; the process is killed once it elapses.
    pub timeout: Duration,
}

impl CommandSpec {
    /// Build a spec from any iterable of string-like arguments.
    ///
    /// A zero timeout is bumped to one millisecond so that every spawned
    /// process has a strictly positive budget.
    pub fn new<I, S>(argv: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            timeout: timeout.max(Duration::from_millis(1)),
        }
    }

    /// Convenience constructor for whole-second budgets.
    pub fn with_secs<I, S>(argv: I, timeout_secs: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(argv, Duration::from_secs(timeout_secs))
    }

    /// The program to execute, if any argument was given.
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Arguments after the program.
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}

/// What happened when a command ran.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandResult {
    /// stdout and stderr interleaved in arrival order.
    pub combined_output: String,
    /// Exit code; `None` when the process was killed (timeout or signal).
    pub exit_code: Option<i32>,
    /// Whether the deadline elapsed before the process exited.
    pub timed_out: bool,
}

/// Caller-facing interpretation of a [`CommandResult`].
///
/// Neither `Failed` nor `TimedOut` is an error: a grep-like check may well
/// be expected to exit non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failed { exit_code: Option<i32> },
    TimedOut,
}

impl CommandResult {
    /// Result of a process that exited on its own.
    pub fn exited(combined_output: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            combined_output: combined_output.into(),
            exit_code,
            timed_out: false,
        }
    }

    /// Result of a process that was killed after its deadline.
    pub fn timed_out(combined_output: impl Into<String>) -> Self {
        Self {
            combined_output: combined_output.into(),
            exit_code: None,
            timed_out: true,
        }
    }

    pub const fn status(&self) -> CommandStatus {
        if self.timed_out {
            CommandStatus::TimedOut
        } else if matches!(self.exit_code, Some(0)) {
            CommandStatus::Success
        } else {
            CommandStatus::Failed {
                exit_code: self.exit_code,
            }
        }
    }

    pub const fn success(&self) -> bool {
        matches!(self.status(), CommandStatus::Success)
    }

    /// Output with surrounding whitespace removed.
    pub fn trimmed_output(&self) -> &str {
        self.combined_output.trim()
    }
}
