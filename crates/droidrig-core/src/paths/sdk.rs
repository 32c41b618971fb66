//! SDK root resolution.
//!
//! Resolution order:
//! 1. Primary environment variable (e.g. `ANDROID_SDK_ROOT`)
//! 2. Secondary environment variable (e.g. `ANDROID_HOME`)
//! 3. `<home>` + fallback suffix (e.g. `~/Library/Android/sdk`)
//!
//! The core function is pure: the environment and home directory are
//! supplied by the caller, so it never fails and never touches the disk.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

/// Primary SDK root variable.
pub const ANDROID_SDK_ROOT_VAR: &str = "ANDROID_SDK_ROOT";

/// Secondary (legacy) SDK root variable.
pub const ANDROID_HOME_VAR: &str = "ANDROID_HOME";

/// Default fallback suffix appended to the home directory.
#[cfg(target_os = "macos")]
pub const DEFAULT_SDK_FALLBACK_SUFFIX: &str = "/Library/Android/sdk";
#[cfg(target_os = "windows")]
pub const DEFAULT_SDK_FALLBACK_SUFFIX: &str = "/AppData/Local/Android/Sdk";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const DEFAULT_SDK_FALLBACK_SUFFIX: &str = "/Android/Sdk";

/// How the SDK root was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SdkSource {
    /// Taken verbatim from the named environment variable.
    EnvVar { variable: String },
    /// Built from the home directory and the fallback suffix.
    Fallback,
}

/// Resolved SDK root. Computed once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkLocation {
    pub path: PathBuf,
    pub source: SdkSource,
}

impl fmt::Display for SdkLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            SdkSource::EnvVar { variable } => {
                write!(f, "{} (from ${variable})", self.path.display())
            }
            SdkSource::Fallback => write!(f, "{} (fallback)", self.path.display()),
        }
    }
}

/// Resolve the SDK root from an environment lookup and a home accessor.
///
/// Empty or whitespace-only variables are treated as unset. If the home
/// directory is unknown the suffix is used as a relative path.
pub fn resolve_sdk_location<E, H>(
    primary_var: &str,
    secondary_var: &str,
    fallback_suffix: &str,
    env_lookup: E,
    home_dir: H,
) -> SdkLocation
where
    E: Fn(&str) -> Option<String>,
    H: FnOnce() -> Option<PathBuf>,
{
    for variable in [primary_var, secondary_var] {
        if let Some(value) = env_lookup(variable).filter(|v| !v.trim().is_empty()) {
            return SdkLocation {
                path: PathBuf::from(value),
                source: SdkSource::EnvVar {
                    variable: variable.to_string(),
                },
            };
        }
    }

    SdkLocation {
        path: join_suffix(home_dir(), fallback_suffix),
        source: SdkSource::Fallback,
    }
}

/// Resolve the Android SDK root from the process environment.
pub fn resolve_android_sdk(fallback_suffix: &str) -> SdkLocation {
    let location = resolve_sdk_location(
        ANDROID_SDK_ROOT_VAR,
        ANDROID_HOME_VAR,
        fallback_suffix,
        |name| env::var(name).ok(),
        dirs::home_dir,
    );

    match &location.source {
        SdkSource::EnvVar { variable } => info!(
            path = %location.path.display(),
            variable = %variable,
            "Using SDK path from environment variable"
        ),
        SdkSource::Fallback => info!(
            path = %location.path.display(),
            "Using fallback SDK path (neither {} nor {} is set)",
            ANDROID_SDK_ROOT_VAR,
            ANDROID_HOME_VAR
        ),
    }

    location
}

/// Append a suffix like `/Library/Android/sdk` to the home directory.
///
/// `Path::join` would treat a leading separator as absolute and discard the
/// home directory, so leading separators are stripped first.
fn join_suffix(home: Option<PathBuf>, suffix: &str) -> PathBuf {
    let relative = suffix.trim_start_matches(['/', '\\']);
    let relative = Path::new(relative);
    match home {
        Some(home) => home.join(relative),
        None => relative.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn home() -> Option<PathBuf> {
        Some(PathBuf::from("/home/tester"))
    }

    #[test]
    fn test_primary_wins_over_secondary() {
        let location = resolve_sdk_location(
            "PRIMARY",
            "SECONDARY",
            "/sdk",
            lookup(&[("PRIMARY", "/opt/primary"), ("SECONDARY", "/opt/secondary")]),
            home,
        );
        assert_eq!(location.path, PathBuf::from("/opt/primary"));
        assert_eq!(
            location.source,
            SdkSource::EnvVar {
                variable: "PRIMARY".to_string()
            }
        );
    }

    #[test]
    fn test_secondary_used_when_primary_missing() {
        let location = resolve_sdk_location(
            "PRIMARY",
            "SECONDARY",
            "/sdk",
            lookup(&[("SECONDARY", "/opt/secondary")]),
            home,
        );
        assert_eq!(location.path, PathBuf::from("/opt/secondary"));
        assert!(matches!(location.source, SdkSource::EnvVar { ref variable } if variable == "SECONDARY"));
    }

    #[test]
    fn test_empty_primary_is_ignored() {
        let location = resolve_sdk_location(
            "PRIMARY",
            "SECONDARY",
            "/sdk",
            lookup(&[("PRIMARY", "  "), ("SECONDARY", "/opt/secondary")]),
            home,
        );
        assert_eq!(location.path, PathBuf::from("/opt/secondary"));
    }

    #[test]
    fn test_fallback_appends_suffix_to_home() {
        let location = resolve_sdk_location(
            "PRIMARY",
            "SECONDARY",
            "/Library/Android/sdk",
            lookup(&[]),
            home,
        );
        assert_eq!(location.source, SdkSource::Fallback);
        assert_eq!(
            location.path,
            PathBuf::from("/home/tester/Library/Android/sdk")
        );
    }

    #[test]
    fn test_fallback_without_home_is_relative() {
        let location = resolve_sdk_location("PRIMARY", "SECONDARY", "/Android/Sdk", lookup(&[]), || {
            None
        });
        assert_eq!(location.path, PathBuf::from("Android/Sdk"));
    }

    #[test]
    fn test_display_mentions_variable() {
        let location = resolve_sdk_location(
            "ANDROID_SDK_ROOT",
            "ANDROID_HOME",
            "/sdk",
            lookup(&[("ANDROID_SDK_ROOT", "/opt/android")]),
            home,
        );
        assert!(location.to_string().contains("$ANDROID_SDK_ROOT"));
    }
}
