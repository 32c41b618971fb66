//! Availability checks backed by real process execution.

#![cfg(unix)]

use std::sync::Arc;

use droidrig_runtime::{AvailabilityChecker, CommandExecutor};

fn checker() -> AvailabilityChecker {
    AvailabilityChecker::new(Arc::new(CommandExecutor::new()))
}

#[tokio::test]
async fn shell_is_found_on_path() {
    assert!(checker().is_available("sh").await);
}

#[tokio::test]
async fn unknown_program_is_unavailable() {
    assert!(
        !checker()
            .is_available("droidrig-no-such-program-on-any-path")
            .await
    );
}

#[tokio::test]
async fn absolute_path_is_checked_directly() {
    assert!(checker().is_available("/bin/sh").await);
    assert!(!checker().is_available("/definitely/not/here").await);
}
