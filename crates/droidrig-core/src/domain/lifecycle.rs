//! Lifecycle state machines for the emulator and the driver service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Emulator boot progress.
///
/// Transitions are monotonic: `NotStarted -> Booting -> {Booted, TimedOut}`.
/// Once a terminal state is reached it never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootStatus {
    #[default]
    NotStarted,
    Booting,
    Booted,
    TimedOut,
}

impl BootStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Booted | Self::TimedOut)
    }

    /// Whether `self -> next` is a legal transition.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Booting)
                | (Self::Booting, Self::Booted | Self::TimedOut)
        )
    }

    /// Apply a transition, returning `false` (and leaving `self` untouched)
    /// when it would move backwards.
    pub fn advance(&mut self, next: Self) -> bool {
        if self.can_transition_to(next) {
            *self = next;
            true
        } else {
            false
        }
    }
}

impl fmt::Display for BootStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "not started",
            Self::Booting => "booting",
            Self::Booted => "booted",
            Self::TimedOut => "timed out",
        };
        f.write_str(s)
    }
}

/// Driver-service lifecycle: `Stopped -> Starting -> Running -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    #[default]
    Stopped,
    Starting,
    Running,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
        };
        f.write_str(s)
    }
}

/// Where a running service can be reached.
///
/// Only meaningful while the owning controller reports `Running`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub host: String,
    pub port: u16,
    pub url: String,
}

impl ServiceEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let url = format!("http://{host}:{port}/");
        Self { host, port, url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_status_forward_transitions() {
        let mut status = BootStatus::default();
        assert!(status.advance(BootStatus::Booting));
        assert!(status.advance(BootStatus::Booted));
        assert_eq!(status, BootStatus::Booted);
    }

    #[test]
    fn test_boot_status_never_moves_back() {
        let mut status = BootStatus::Booting;
        assert!(status.advance(BootStatus::TimedOut));
        assert!(!status.advance(BootStatus::Booting));
        assert!(!status.advance(BootStatus::Booted));
        assert_eq!(status, BootStatus::TimedOut);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_boot_status_cannot_skip_booting() {
        let mut status = BootStatus::NotStarted;
        assert!(!status.advance(BootStatus::Booted));
        assert_eq!(status, BootStatus::NotStarted);
    }

    #[test]
    fn test_endpoint_url() {
        let endpoint = ServiceEndpoint::new("127.0.0.1", 4723);
        assert_eq!(endpoint.url, "http://127.0.0.1:4723/");
    }
}
