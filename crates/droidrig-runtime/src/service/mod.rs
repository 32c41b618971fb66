//! Driver-server (Appium) control.

mod controller;
mod readiness;

pub use controller::{ServiceConfig, ServiceController};
