// Linkbook platform paths for macOS
// Config: ~/Library/Application Support/Linkbook
// Data:   ~/Library/Application Support/Linkbook

use std::env;
use std::path::PathBuf;

fn app_support_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
        .join("Library")
        .join("Application Support")
        .join("Linkbook")
}

/// `~/Library/Application Support/Linkbook`
pub fn get_config_dir() -> PathBuf {
    app_support_dir()
}

/// `~/Library/Application Support/Linkbook`
pub fn get_data_dir() -> PathBuf {
    app_support_dir()
}
