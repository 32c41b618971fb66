//! Path utilities: SDK root, SDK tool locations, and the resource root.
//!
//! # Design
//!
//! - SDK resolution is pure and infallible; the fallback is always defined
//! - No process spawning here; availability checks live in the runtime crate
//! - OS-specific binary names and suffixes are decided in `tools`; callers
//!   use the exported helpers instead of building file names

mod error;
mod resources;
mod sdk;
mod tools;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::PathError;
pub use resources::{RESOURCE_DIR_VAR, resource_root};
pub use sdk::{
    ANDROID_HOME_VAR, ANDROID_SDK_ROOT_VAR, DEFAULT_SDK_FALLBACK_SUFFIX, SdkLocation, SdkSource,
    resolve_android_sdk, resolve_sdk_location,
};
pub use tools::{emulator_executable, path_search_utility, sdk_adb_executable};
