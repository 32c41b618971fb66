//! Child-process plumbing shared by the executor and the controllers.

pub mod launcher;
pub mod shutdown;
pub mod stream;

pub use launcher::DetachedLauncher;
pub use shutdown::{DEFAULT_SHUTDOWN_GRACE, kill_tree, shutdown_child};
