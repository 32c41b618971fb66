//! Configuration handlers: `caps` and `profile`.

use anyhow::Result;
use droidrig_core::{CapabilitySet, Profile, ServerTarget};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Resolve and print a capability set.
pub fn caps(
    ctx: &CliContext,
    platform: &str,
    environment: &str,
    overrides: &[String],
    json: bool,
) -> Result<()> {
    let mut resolver = ctx.resolver()?;
    for raw in overrides {
        let (variable, key) = parse_override(raw)?;
        resolver = resolver.with_override(variable, key);
    }

    let set = resolver
        .resolve(platform, environment)
        .map_err(CliError::from)?;
    print_set(&set, json)
}

/// Resolve and print a server profile.
pub fn profile(ctx: &CliContext, name: Option<&str>, json: bool) -> Result<()> {
    let resolver = ctx.resolver()?;
    let set = match name {
        Some(name) => resolver.resolve_named_profile(Profile::from_selector(Some(name))),
        None => resolver.resolve_profile(),
    }
    .map_err(CliError::from)?;

    if !json {
        println!("Server: {}", ServerTarget::from_capabilities(&set).url());
    }
    print_set(&set, json)
}

fn print_set(set: &CapabilitySet, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&set.to_json())?);
        return Ok(());
    }

    let provenance = set.provenance();
    println!(
        "# {} ({})",
        provenance.source_path.display(),
        provenance.source_format
    );
    if !provenance.overridden_keys.is_empty() {
        println!(
            "# overridden from environment: {}",
            provenance.overridden_keys.join(", ")
        );
    }
    print!("{set}");
    Ok(())
}

/// Split `VAR=key`.
pub fn parse_override(raw: &str) -> Result<(String, String), CliError> {
    match raw.split_once('=') {
        Some((variable, key)) if !variable.trim().is_empty() && !key.trim().is_empty() => {
            Ok((variable.trim().to_string(), key.trim().to_string()))
        }
        _ => Err(CliError::Arguments(format!(
            "override '{raw}' must look like VAR=capabilityKey"
        ))),
    }
}
