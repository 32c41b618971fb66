//! Emulator lifecycle: launch, boot detection, and shutdown.
//!
//! The emulator is spawned detached and never awaited. Readiness is decided
//! solely by polling `sys.boot_completed` through short-lived adb probes:
//!
//! ```text
//! NotStarted --start--> Booting --sentinel seen--> Booted
//!                          \-----deadline reached--> TimedOut
//! ```
//!
//! A boot timeout stops polling but leaves the emulator running; callers
//! decide whether to retry (`is_boot_completed`) or `stop()`.

use std::sync::Arc;
use std::time::Duration;

use droidrig_core::{
    BootStatus, CommandRunner, CommandSpec, OrchestratorError, OrchestratorResult,
    ProcessLauncher, Settings,
};
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, error, info, warn};

use super::args::{
    BOOT_COMPLETED_SENTINEL, EmulatorTools, boot_probe_args, chmod_args, kill_args,
    launch_args, list_avds_args,
};
use crate::availability::AvailabilityChecker;
use crate::deadline::deadline_after;

pub const DEFAULT_BOOT_TIMEOUT: Duration = Duration::from_secs(180);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const KILL_TIMEOUT: Duration = Duration::from_secs(15);
const LIST_AVDS_TIMEOUT: Duration = Duration::from_secs(30);
const CHMOD_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed configuration for one emulator session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorConfig {
    pub avd_name: String,
    pub headless: bool,
    /// Overall deadline for boot detection.
    pub boot_timeout: Duration,
    pub poll_interval: Duration,
    /// Budget for each individual probe; always clamped to the time left.
    pub probe_timeout: Duration,
    /// adb device serial (`-s`); `None` targets the only attached device.
    pub serial: Option<String>,
}

impl EmulatorConfig {
    pub fn new(avd_name: impl Into<String>) -> Self {
        Self {
            avd_name: avd_name.into(),
            headless: false,
            boot_timeout: DEFAULT_BOOT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            serial: None,
        }
    }

    /// Build from settings; `None` when no AVD is configured.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        let avd_name = settings.avd_name.clone()?;
        Some(Self {
            avd_name,
            headless: settings.headless,
            boot_timeout: settings.boot_timeout(),
            poll_interval: settings.poll_interval(),
            probe_timeout: settings.probe_timeout(),
            serial: None,
        })
    }

    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub const fn with_boot_timeout(mut self, boot_timeout: Duration) -> Self {
        self.boot_timeout = boot_timeout;
        self
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub const fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    #[must_use]
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }
}

/// Owns the boot state of one emulator.
pub struct EmulatorController {
    config: EmulatorConfig,
    tools: EmulatorTools,
    runner: Arc<dyn CommandRunner>,
    launcher: Arc<dyn ProcessLauncher>,
    availability: AvailabilityChecker,
    status: BootStatus,
    pid: Option<u32>,
}

impl std::fmt::Debug for EmulatorController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmulatorController")
            .field("config", &self.config)
            .field("tools", &self.tools)
            .field("status", &self.status)
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}

impl EmulatorController {
    pub fn new(
        config: EmulatorConfig,
        tools: EmulatorTools,
        runner: Arc<dyn CommandRunner>,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Self {
        let availability = AvailabilityChecker::new(Arc::clone(&runner));
        Self {
            config,
            tools,
            runner,
            launcher,
            availability,
            status: BootStatus::NotStarted,
            pid: None,
        }
    }

    pub const fn status(&self) -> BootStatus {
        self.status
    }

    pub const fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub const fn tools(&self) -> &EmulatorTools {
        &self.tools
    }

    /// PID of the launched emulator, if this controller launched one.
    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Launch the emulator and wait for it to finish booting.
    ///
    /// Returns the terminal status (`Booted` or `TimedOut`). Only valid from
    /// `NotStarted`.
    ///
    /// # Errors
    ///
    /// - `EmulatorAlreadyStarted` if this controller already launched
    /// - `ExecutableNotFound` if the emulator binary or adb is unavailable
    /// - `EmulatorLaunchFailed` if the OS refused to spawn the emulator
    pub async fn start(&mut self) -> OrchestratorResult<BootStatus> {
        if self.status != BootStatus::NotStarted {
            return Err(OrchestratorError::EmulatorAlreadyStarted {
                avd: self.config.avd_name.clone(),
            });
        }

        let emulator = self.tools.emulator.to_string_lossy().into_owned();
        if !self.availability.is_available(&emulator).await {
            return Err(OrchestratorError::ExecutableNotFound { program: emulator });
        }
        let adb = self.tools.adb.to_string_lossy().into_owned();
        if !self.availability.is_available(&adb).await {
            return Err(OrchestratorError::ExecutableNotFound { program: adb });
        }

        let argv = launch_args(&self.tools.emulator, &self.config.avd_name, self.config.headless);
        let pid = self
            .launcher
            .spawn_detached(&argv)
            .map_err(|e| OrchestratorError::EmulatorLaunchFailed {
                command: argv.join(" "),
                reason: e.to_string(),
            })?;

        self.pid = Some(pid);
        self.status.advance(BootStatus::Booting);
        info!(
            avd = %self.config.avd_name,
            pid,
            boot_timeout_secs = self.config.boot_timeout.as_secs(),
            "Emulator launched, waiting for boot"
        );

        let outcome = self.wait_for_boot().await;
        self.status.advance(outcome);
        Ok(self.status)
    }

    async fn wait_for_boot(&self) -> BootStatus {
        let started = Instant::now();
        let deadline = deadline_after(self.config.boot_timeout);
        let mut polls: u32 = 0;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            polls += 1;
            if self.probe(self.config.probe_timeout.min(remaining)).await {
                info!(
                    avd = %self.config.avd_name,
                    polls,
                    elapsed_secs = started.elapsed().as_secs(),
                    "Emulator booted"
                );
                return BootStatus::Booted;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            sleep(self.config.poll_interval.min(remaining)).await;
        }

        warn!(
            avd = %self.config.avd_name,
            polls,
            boot_timeout_secs = self.config.boot_timeout.as_secs(),
            "Emulator did not finish booting before the deadline"
        );
        BootStatus::TimedOut
    }

    /// Issue a single boot probe. Any failure counts as "not booted".
    pub async fn is_boot_completed(&self) -> bool {
        self.probe(self.config.probe_timeout).await
    }

    async fn probe(&self, budget: Duration) -> bool {
        let spec = CommandSpec::new(
            boot_probe_args(&self.tools.adb, self.config.serial.as_deref()),
            budget,
        );

        // The runner bounds the probe itself; this also bounds any runner
        match timeout(budget, self.runner.execute(&spec)).await {
            Ok(Ok(result)) if result.timed_out => {
                debug!(command = %spec, "Boot probe timed out");
                false
            }
            Ok(Ok(result)) => {
                let value = result.trimmed_output();
                debug!(command = %spec, value = %value, "Boot probe");
                result.success() && value == BOOT_COMPLETED_SENTINEL
            }
            Ok(Err(e)) => {
                debug!(command = %spec, error = %e, "Boot probe failed to run");
                false
            }
            Err(_) => {
                debug!(command = %spec, "Boot probe exceeded its budget");
                false
            }
        }
    }

    /// Ask the device to shut down. Fire-and-forget: termination is not
    /// verified and nothing is returned, even when adb is missing or the
    /// command fails.
    pub async fn stop(&self) {
        let adb = self.tools.adb.to_string_lossy().into_owned();
        if !self.availability.is_available(&adb).await {
            error!(adb = %adb, "adb is not available, cannot stop emulator");
            return;
        }

        let spec = CommandSpec::new(
            kill_args(&self.tools.adb, self.config.serial.as_deref()),
            KILL_TIMEOUT,
        );
        match self.runner.execute(&spec).await {
            Ok(result) if result.success() => {
                info!(avd = %self.config.avd_name, "Emulator kill requested");
            }
            Ok(result) => {
                info!(
                    command = %spec,
                    status = ?result.status(),
                    output = %result.trimmed_output(),
                    "Emulator kill command did not succeed (emulator may not be running)"
                );
            }
            Err(e) => {
                error!(command = %spec, error = %e, "Failed to run emulator kill command");
            }
        }
    }

    /// `stop()`, then poll until the device stops reporting a completed boot.
    ///
    /// Returns whether termination was observed within `wait`.
    pub async fn stop_and_verify(&self, wait: Duration) -> bool {
        self.stop().await;

        let deadline = deadline_after(wait);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(avd = %self.config.avd_name, "Emulator still answering after stop");
                return false;
            }
            if !self.probe(self.config.probe_timeout.min(remaining)).await {
                info!(avd = %self.config.avd_name, "Emulator termination observed");
                return true;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            sleep(self.config.poll_interval.min(remaining)).await;
        }
    }

    /// Names of the AVDs the SDK knows about.
    ///
    /// # Errors
    ///
    /// Propagates `ExecutableNotFound` / `CommandSpawn` from the runner.
    pub async fn list_avds(&self) -> OrchestratorResult<Vec<String>> {
        let spec = CommandSpec::new(list_avds_args(&self.tools.emulator), LIST_AVDS_TIMEOUT);
        let result = self.runner.execute(&spec).await?;
        if !result.success() {
            warn!(command = %spec, status = ?result.status(), "Listing AVDs did not succeed");
        }

        Ok(result
            .combined_output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Make sure the emulator binary is executable (Unix only).
    ///
    /// Failures are logged; a later `start()` reports the real problem.
    pub async fn ensure_permissions(&self) {
        if cfg!(target_os = "windows") {
            info!("Skipping permission repair on Windows");
            return;
        }

        let spec = CommandSpec::new(chmod_args(&self.tools.emulator), CHMOD_TIMEOUT);
        match self.runner.execute(&spec).await {
            Ok(result) if result.success() => {
                debug!(path = %self.tools.emulator.display(), "Emulator marked executable");
            }
            Ok(result) => {
                warn!(command = %spec, output = %result.trimmed_output(), "chmod did not succeed");
            }
            Err(e) => warn!(command = %spec, error = %e, "Failed to run chmod"),
        }
    }
}
