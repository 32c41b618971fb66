//! Emulator handlers: `avds`, `boot`, `stop-emulator`.

use std::time::Duration;

use anyhow::Result;
use droidrig_core::BootStatus;
use droidrig_runtime::EmulatorConfig;

use crate::bootstrap::CliContext;
use crate::commands::EmulatorArgs;
use crate::error::CliError;

/// List the AVDs the SDK emulator knows about.
pub async fn list_avds(ctx: &CliContext) -> Result<()> {
    // The AVD name is irrelevant for listing
    let emulator = ctx.emulator(EmulatorConfig::new(""));
    emulator.ensure_permissions().await;

    let avds = emulator.list_avds().await.map_err(CliError::from)?;
    if avds.is_empty() {
        println!("No AVDs found.");
    } else {
        for avd in avds {
            println!("{avd}");
        }
    }
    Ok(())
}

/// Launch the emulator and wait for boot.
///
/// A boot timeout leaves the emulator running so the caller can decide
/// whether to wait longer or stop it.
pub async fn boot(ctx: &CliContext, args: &EmulatorArgs) -> Result<()> {
    let config = args.to_config(ctx.settings())?;
    let mut emulator = ctx.emulator(config);
    emulator.ensure_permissions().await;

    match emulator.start().await.map_err(CliError::from)? {
        BootStatus::Booted => {
            println!("✓ Emulator '{}' booted", emulator.config().avd_name);
            Ok(())
        }
        status => Err(CliError::Timeout(format!(
            "emulator '{}' is {status} after {}s; it is still running (use `droidrig stop-emulator`)",
            emulator.config().avd_name,
            emulator.config().boot_timeout.as_secs()
        ))
        .into()),
    }
}

/// Send the kill command, optionally waiting for the device to go away.
pub async fn stop(ctx: &CliContext, serial: Option<String>, verify: Option<u64>) -> Result<()> {
    let mut config = EmulatorConfig::new("");
    if let Some(serial) = serial {
        config = config.with_serial(serial);
    }
    let emulator = ctx.emulator(config);

    match verify {
        None => {
            emulator.stop().await;
            println!("Emulator stop requested.");
            Ok(())
        }
        Some(secs) => {
            if emulator.stop_and_verify(Duration::from_secs(secs)).await {
                println!("✓ Emulator stopped");
                Ok(())
            } else {
                Err(CliError::Timeout(format!("emulator still answering after {secs}s")).into())
            }
        }
    }
}
