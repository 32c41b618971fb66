//! Advisory checks for whether a program can be run.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use droidrig_core::{CommandRunner, CommandSpec, path_search_utility};
use tracing::{debug, warn};

/// Upper bound for a single PATH search.
pub const PATH_SEARCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Answers "can this program be launched?" without ever failing.
#[derive(Clone)]
pub struct AvailabilityChecker {
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for AvailabilityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityChecker").finish_non_exhaustive()
    }
}

impl AvailabilityChecker {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Whether `name_or_path` refers to something runnable.
    ///
    /// Paths (anything with a directory component) are checked on disk.
    /// Bare names are looked up with the platform's PATH-search utility; any
    /// failure to run it counts as unavailable.
    pub async fn is_available(&self, name_or_path: &str) -> bool {
        let trimmed = name_or_path.trim();
        if trimmed.is_empty() {
            return false;
        }

        if is_path_like(trimmed) {
            let available = is_executable_file(Path::new(trimmed));
            debug!(path = %trimmed, available, "Checked executable path");
            return available;
        }

        let spec = CommandSpec::new([path_search_utility(), trimmed], PATH_SEARCH_TIMEOUT);
        match self.runner.execute(&spec).await {
            Ok(result) => {
                let available = result.success() && !result.trimmed_output().is_empty();
                debug!(program = %trimmed, available, "Searched PATH");
                available
            }
            Err(e) => {
                warn!(
                    program = %trimmed,
                    command = %spec,
                    error = %e,
                    "PATH search failed, treating program as unavailable"
                );
                false
            }
        }
    }
}

/// Whether the input names a location rather than a bare program name.
pub fn is_path_like(input: &str) -> bool {
    let path = Path::new(input);
    path.is_absolute() || path.components().count() > 1
}

/// Exists, is a regular file, and (on Unix) has an execute bit set.
pub fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}
