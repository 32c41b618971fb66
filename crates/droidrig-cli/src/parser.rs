//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for provisioning Android test environments.
///
/// Global options apply to every subcommand and override the matching
/// `DROIDRIG_*` settings.
#[derive(Parser, Debug)]
#[command(name = "droidrig")]
#[command(about = "Boot Android emulators, run the driver server, and resolve capabilities")]
#[command(version)]
pub struct Cli {
    /// Base directory containing `config/` (overrides DROIDRIG_RESOURCE_DIR)
    #[arg(long = "resource-dir", global = true)]
    pub resource_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
