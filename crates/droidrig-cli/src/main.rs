//! CLI entry point - the composition root.
//!
//! Loads `.env`, installs logging, parses arguments, and dispatches to the
//! handlers. Errors are printed once here and mapped to an exit code.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use droidrig_cli::{Cli, CliConfig, Commands, bootstrap, exit_code_for, handlers};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before settings are read
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = bootstrap(CliConfig::from_env(cli.resource_dir)?)?;

    match cli.command {
        Commands::Sdk => handlers::tools::sdk(&ctx).await,
        Commands::Which { name } => handlers::tools::which(&ctx, &name).await,
        Commands::Avds => handlers::emulator::list_avds(&ctx).await,
        Commands::Boot { emulator } => handlers::emulator::boot(&ctx, &emulator).await,
        Commands::StopEmulator { serial, verify } => {
            handlers::emulator::stop(&ctx, serial, verify).await
        }
        Commands::Caps {
            platform,
            environment,
            overrides,
            json,
        } => handlers::config::caps(&ctx, &platform, &environment, &overrides, json),
        Commands::Profile { name, json } => handlers::config::profile(&ctx, name.as_deref(), json),
        Commands::Session {
            platform,
            environment,
            emulator,
            no_emulator,
        } => handlers::session::run(&ctx, &platform, &environment, &emulator, no_emulator).await,
    }
}
