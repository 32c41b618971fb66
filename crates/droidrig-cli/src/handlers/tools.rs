//! `sdk` and `which` handlers.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Print the SDK root and whether its tools are usable.
pub async fn sdk(ctx: &CliContext) -> Result<()> {
    let availability = ctx.availability();
    let tools = ctx.tools();

    println!("SDK root: {}", ctx.sdk());
    for (label, path) in [("emulator", &tools.emulator), ("adb", &tools.adb)] {
        let available = availability.is_available(&path.to_string_lossy()).await;
        let marker = if available { "✓" } else { "✗" };
        println!("  {marker} {label:<9} {}", path.display());
    }
    Ok(())
}

/// Report whether `name` can be run; fails when it cannot.
pub async fn which(ctx: &CliContext, name: &str) -> Result<()> {
    if ctx.availability().is_available(name).await {
        println!("✓ {name} is available");
        Ok(())
    } else {
        Err(CliError::Process(format!("{name} is not available")).into())
    }
}
