//! Locations of the SDK tools droidrig drives.

use std::path::{Path, PathBuf};

#[cfg(target_os = "windows")]
const EXE_SUFFIX: &str = ".exe";
#[cfg(not(target_os = "windows"))]
const EXE_SUFFIX: &str = "";

/// `<sdk>/emulator/emulator` (`.exe` on Windows).
pub fn emulator_executable(sdk_root: &Path) -> PathBuf {
    sdk_root
        .join("emulator")
        .join(format!("emulator{EXE_SUFFIX}"))
}

/// `<sdk>/platform-tools/adb` (`.exe` on Windows).
pub fn sdk_adb_executable(sdk_root: &Path) -> PathBuf {
    sdk_root
        .join("platform-tools")
        .join(format!("adb{EXE_SUFFIX}"))
}

/// Name of the PATH-search utility for this platform.
pub const fn path_search_utility() -> &'static str {
    if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emulator_executable_layout() {
        let path = emulator_executable(Path::new("/opt/sdk"));
        assert!(path.starts_with("/opt/sdk/emulator"));

        #[cfg(target_os = "windows")]
        assert!(path.to_string_lossy().ends_with("emulator.exe"));

        #[cfg(not(target_os = "windows"))]
        assert!(path.to_string_lossy().ends_with("emulator/emulator"));
    }

    #[test]
    fn test_adb_executable_layout() {
        let path = sdk_adb_executable(Path::new("/opt/sdk"));
        assert!(path.starts_with("/opt/sdk/platform-tools"));
    }

    #[test]
    fn test_path_search_utility() {
        #[cfg(not(target_os = "windows"))]
        assert_eq!(path_search_utility(), "which");
        #[cfg(target_os = "windows")]
        assert_eq!(path_search_utility(), "where");
    }
}
