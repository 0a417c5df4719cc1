// Linkbook platform abstraction
// Resolves where settings and the record database live on each OS.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::env;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Environment variable that relocates the data directory.
pub const DATA_DIR_ENV: &str = "LINKBOOK_DATA_DIR";

/// Returns the platform-specific configuration directory for Linkbook.
///
/// - **Linux**: `~/.config/linkbook` (or `$XDG_CONFIG_HOME/linkbook`)
/// - **macOS**: `~/Library/Application Support/Linkbook`
/// - **Windows**: `%APPDATA%/Linkbook`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the directory holding the record database.
///
/// `$LINKBOOK_DATA_DIR` wins when set and non-empty; otherwise:
/// - **Linux**: `~/.local/share/linkbook` (or `$XDG_DATA_HOME/linkbook`)
/// - **macOS**: `~/Library/Application Support/Linkbook`
/// - **Windows**: `%APPDATA%/Linkbook`
pub fn get_data_dir() -> PathBuf {
    data_dir_with_override(env::var(DATA_DIR_ENV).ok())
}

fn data_dir_with_override(dir: Option<String>) -> PathBuf {
    if let Some(dir) = dir.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
