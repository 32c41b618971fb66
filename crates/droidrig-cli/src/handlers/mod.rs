//! Command handlers.
//!
//! Each handler takes the composed `CliContext` and prints its result to
//! stdout; diagnostics go through `tracing` to stderr.

pub mod config;
pub mod emulator;
pub mod session;
pub mod tools;
