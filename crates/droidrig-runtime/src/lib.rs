//! Process execution and lifecycle controllers for droidrig.
//!
//! - [`CommandExecutor`]: the real [`droidrig_core::CommandRunner`]
//! - [`AvailabilityChecker`]: advisory "is this runnable?" checks
//! - [`EmulatorController`]: detached emulator launch plus boot polling
//! - [`ServiceController`]: owned driver-server process

#![deny(unused_crate_dependencies)]

pub mod availability;
pub mod command;
mod deadline;
pub mod emulator;
pub mod process;
pub mod service;

pub use availability::{AvailabilityChecker, PATH_SEARCH_TIMEOUT, is_executable_file};
pub use command::CommandExecutor;
pub use emulator::{EmulatorConfig, EmulatorController, EmulatorTools};
pub use process::DetachedLauncher;
pub use service::{ServiceConfig, ServiceController};
