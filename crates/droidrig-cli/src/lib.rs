//! The `droidrig` command-line adapter.
//!
//! Parsing lives in [`parser`] and [`commands`], wiring in [`bootstrap`],
//! and each subcommand in [`handlers`].

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, EmulatorArgs};
pub use error::{CliError, exit_code_for};
pub use parser::Cli;
