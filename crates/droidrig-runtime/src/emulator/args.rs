//! Exact command lines for the emulator and adb.

use std::path::{Path, PathBuf};

use droidrig_core::{emulator_executable, sdk_adb_executable};
use tracing::debug;

use crate::availability::is_executable_file;

/// Value of `sys.boot_completed` once Android has finished booting.
pub const BOOT_COMPLETED_SENTINEL: &str = "1";

/// The emulator has no windowless mode on Windows.
pub const HEADLESS_SUPPORTED: bool = cfg!(not(target_os = "windows"));

/// Paths of the two SDK programs the emulator controller drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorTools {
    pub emulator: PathBuf,
    pub adb: PathBuf,
}

impl EmulatorTools {
    /// Locate the tools inside an SDK root.
    ///
    /// adb comes from `platform-tools/` when that binary is usable, otherwise
    /// the bare name is used and left to PATH lookup.
    pub fn from_sdk(sdk_root: &Path) -> Self {
        let bundled_adb = sdk_adb_executable(sdk_root);
        let adb = if is_executable_file(&bundled_adb) {
            bundled_adb
        } else {
            debug!(
                path = %bundled_adb.display(),
                "No usable adb in the SDK, falling back to PATH"
            );
            PathBuf::from("adb")
        };

        Self {
            emulator: emulator_executable(sdk_root),
            adb,
        }
    }
}

/// `<emulator> -avd <name> -no-snapshot-load -no-boot-anim [-no-window]`
pub fn launch_args(emulator: &Path, avd_name: &str, headless: bool) -> Vec<String> {
    let mut argv = vec![
        path_arg(emulator),
        "-avd".to_string(),
        avd_name.to_string(),
        "-no-snapshot-load".to_string(),
        "-no-boot-anim".to_string(),
    ];
    if headless && HEADLESS_SUPPORTED {
        argv.push("-no-window".to_string());
    }
    argv
}

/// `<emulator> -list-avds`
pub fn list_avds_args(emulator: &Path) -> Vec<String> {
    vec![path_arg(emulator), "-list-avds".to_string()]
}

/// `chmod +x <emulator>`
pub fn chmod_args(emulator: &Path) -> Vec<String> {
    vec!["chmod".to_string(), "+x".to_string(), path_arg(emulator)]
}

/// `<adb> [-s <serial>] shell getprop sys.boot_completed`
pub fn boot_probe_args(adb: &Path, serial: Option<&str>) -> Vec<String> {
    let mut argv = adb_prefix(adb, serial);
    argv.extend(["shell", "getprop", "sys.boot_completed"].map(String::from));
    argv
}

/// `<adb> [-s <serial>] emu kill`
pub fn kill_args(adb: &Path, serial: Option<&str>) -> Vec<String> {
    let mut argv = adb_prefix(adb, serial);
    argv.extend(["emu", "kill"].map(String::from));
    argv
}

fn adb_prefix(adb: &Path, serial: Option<&str>) -> Vec<String> {
    let mut argv = vec![path_arg(adb)];
    if let Some(serial) = serial {
        argv.push("-s".to_string());
        argv.push(serial.to_string());
    }
    argv
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
