//! `session` handler: the full provisioning flow.
//!
//! resolve SDK -> boot emulator -> start driver server -> resolve
//! capabilities -> print session parameters -> wait for Ctrl-C -> tear down.
//! Anything started before a failure is torn down before the error is
//! returned.

use anyhow::Result;
use droidrig_core::BootStatus;
use droidrig_runtime::{EmulatorController, ServiceController};
use tracing::info;

use crate::bootstrap::CliContext;
use crate::commands::EmulatorArgs;
use crate::error::CliError;

/// Run a session until interrupted.
pub async fn run(
    ctx: &CliContext,
    platform: &str,
    environment: &str,
    emulator_args: &EmulatorArgs,
    no_emulator: bool,
) -> Result<()> {
    info!(sdk = %ctx.sdk(), "Starting session");

    // Resolve before launching anything so config mistakes fail fast
    let capabilities = ctx
        .resolver()?
        .resolve(platform, environment)
        .map_err(CliError::from)?;

    let emulator = if no_emulator {
        None
    } else {
        Some(boot_emulator(ctx, emulator_args).await?)
    };

    let mut service = ctx.service();
    let endpoint = match service.start().await {
        Ok(endpoint) => endpoint,
        Err(e) => {
            teardown(None, emulator.as_ref()).await;
            return Err(CliError::from(e).into());
        }
    };

    println!("Server:       {}", endpoint.url);
    println!(
        "Capabilities: {}",
        serde_json::to_string(&capabilities.to_json())?
    );
    println!("Press Ctrl-C to end the session.");

    let waited = tokio::signal::ctrl_c().await;
    info!("Ending session");
    teardown(Some(&mut service), emulator.as_ref()).await;
    waited.map_err(CliError::from)?;
    Ok(())
}

async fn boot_emulator(ctx: &CliContext, args: &EmulatorArgs) -> Result<EmulatorController> {
    let mut emulator = ctx.emulator(args.to_config(ctx.settings())?);
    emulator.ensure_permissions().await;

    match emulator.start().await.map_err(CliError::from)? {
        BootStatus::Booted => Ok(emulator),
        status => {
            emulator.stop().await;
            Err(CliError::Timeout(format!(
                "emulator '{}' is {status} after {}s",
                emulator.config().avd_name,
                emulator.config().boot_timeout.as_secs()
            ))
            .into())
        }
    }
}

async fn teardown(service: Option<&mut ServiceController>, emulator: Option<&EmulatorController>) {
    if let Some(service) = service {
        service.stop().await;
    }
    if let Some(emulator) = emulator {
        emulator.stop().await;
    }
}
