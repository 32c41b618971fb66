//! Android emulator control.

mod args;
mod controller;

pub use args::{
    BOOT_COMPLETED_SENTINEL, EmulatorTools, HEADLESS_SUPPORTED, boot_probe_args, chmod_args,
    kill_args, launch_args, list_avds_args,
};
pub use controller::{
    DEFAULT_BOOT_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_PROBE_TIMEOUT, EmulatorConfig,
    EmulatorController,
};
