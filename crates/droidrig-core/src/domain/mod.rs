//! Domain types shared by every droidrig component.
//!
//! These are plain value types with no process or filesystem access.

mod capabilities;
mod command;
mod lifecycle;

pub use capabilities::{CapabilitySet, CapabilityValue, Provenance, SourceFormat};
pub use command::{CommandResult, CommandSpec, CommandStatus};
pub use lifecycle::{BootStatus, ServiceEndpoint, ServiceState};
