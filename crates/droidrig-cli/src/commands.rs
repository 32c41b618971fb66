//! Main commands enum and shared argument groups.

use clap::{Args, Subcommand};
use droidrig_core::settings::AVD_VAR;
use droidrig_core::{Settings, validate_settings};
use droidrig_runtime::EmulatorConfig;

use crate::error::CliError;

/// Available droidrig commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the resolved Android SDK root and tool locations
    Sdk,

    /// Check whether a program is available (PATH name or path)
    Which {
        /// Program name or path
        name: String,
    },

    /// List the AVDs known to the SDK emulator
    Avds,

    /// Launch an emulator and wait until it has booted
    Boot {
        #[command(flatten)]
        emulator: EmulatorArgs,
    },

    /// Ask the running emulator to shut down
    StopEmulator {
        /// adb device serial to target
        #[arg(long)]
        serial: Option<String>,

        /// Wait up to this many seconds for the device to disappear
        #[arg(long, value_name = "SECS")]
        verify: Option<u64>,
    },

    /// Resolve the capability set for a platform and environment
    Caps {
        /// Platform name (e.g. android)
        platform: String,

        /// Environment name (e.g. dev)
        environment: String,

        /// Replace a capability from an environment variable (VAR=key)
        #[arg(long = "env-override", value_name = "VAR=KEY")]
        overrides: Vec<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve the server profile selected by APPIUM_ENV
    Profile {
        /// Profile to load instead of APPIUM_ENV (local, staging, production)
        #[arg(long)]
        name: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Boot the emulator, start the driver server, and hold the session until Ctrl-C
    Session {
        /// Platform name (e.g. android)
        platform: String,

        /// Environment name (e.g. dev)
        environment: String,

        #[command(flatten)]
        emulator: EmulatorArgs,

        /// Use an already-running device instead of launching an emulator
        #[arg(long)]
        no_emulator: bool,
    },
}

/// Emulator options shared by `boot` and `session`.
#[derive(Args, Debug, Clone, Default)]
pub struct EmulatorArgs {
    /// AVD to launch (overrides DROIDRIG_AVD)
    #[arg(long)]
    pub avd: Option<String>,

    /// Run without a window (ignored on Windows)
    #[arg(long)]
    pub headless: bool,

    /// Overall boot deadline in seconds
    #[arg(long, value_name = "SECS")]
    pub boot_timeout: Option<u64>,

    /// Seconds between boot probes
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// adb device serial to probe
    #[arg(long)]
    pub serial: Option<String>,
}

impl EmulatorArgs {
    /// Overlay these flags on `settings` and build the emulator config.
    ///
    /// # Errors
    ///
    /// `Arguments` when no AVD is known, `Config` when the merged values
    /// are invalid.
    pub fn to_config(&self, settings: &Settings) -> Result<EmulatorConfig, CliError> {
        let mut settings = settings.clone();
        if let Some(avd) = &self.avd {
            settings.avd_name = Some(avd.clone());
        }
        if self.headless {
            settings.headless = true;
        }
        if let Some(secs) = self.boot_timeout {
            settings.boot_timeout_secs = secs;
        }
        if let Some(secs) = self.poll_interval {
            settings.poll_interval_secs = secs;
        }

        validate_settings(&settings)?;

        let config = EmulatorConfig::from_settings(&settings).ok_or_else(|| {
            CliError::Arguments(format!("no AVD configured; pass --avd or set {AVD_VAR}"))
        })?;
        Ok(match &self.serial {
            Some(serial) => config.with_serial(serial.clone()),
            None => config,
        })
    }
}
