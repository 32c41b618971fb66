//! Resource root resolution.
//!
//! Capability and profile files live under `<resource root>/config/`.

use std::env;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable overriding the resource root.
pub const RESOURCE_DIR_VAR: &str = "DROIDRIG_RESOURCE_DIR";

/// Get the root directory for bundled configuration resources.
///
/// Resolution order:
/// 1. Explicit path provided by the caller (CLI flag or settings)
/// 2. `DROIDRIG_RESOURCE_DIR` environment variable
/// 3. Current working directory
pub fn resource_root(explicit: Option<&Path>) -> Result<PathBuf, PathError> {
    let candidate = match explicit {
        Some(path) => path.to_path_buf(),
        None => match env::var(RESOURCE_DIR_VAR) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => {
                return env::current_dir().map_err(|e| PathError::CurrentDirError(e.to_string()));
            }
        },
    };

    if !candidate.exists() {
        return Err(PathError::DirectoryNotFound(candidate));
    }
    if !candidate.is_dir() {
        return Err(PathError::NotADirectory(candidate));
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};
    use tempfile::TempDir;

    #[test]
    fn test_explicit_root_wins() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let _env = EnvVarGuard::set(RESOURCE_DIR_VAR, "/definitely/not/here");

        let root = resource_root(Some(dir.path())).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn test_env_root_used_when_no_explicit() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let _env = EnvVarGuard::set(RESOURCE_DIR_VAR, &dir.path().to_string_lossy());

        let root = resource_root(None).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn test_missing_root_is_reported() {
        let _lock = ENV_LOCK.lock().unwrap();
        let err = resource_root(Some(Path::new("/definitely/not/here"))).unwrap_err();
        assert!(matches!(err, PathError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_file_root_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        let err = resource_root(Some(&file)).unwrap_err();
        assert!(matches!(err, PathError::NotADirectory(_)));
    }
}
