// Linkbook platform paths for Windows
// Config: %APPDATA%/Linkbook
// Data:   %APPDATA%/Linkbook

use std::env;
use std::path::PathBuf;

fn roaming_dir() -> PathBuf {
    let appdata = env::var("APPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("Linkbook")
}

/// `%APPDATA%/Linkbook`
pub fn get_config_dir() -> PathBuf {
    roaming_dir()
}

/// `%APPDATA%/Linkbook`
pub fn get_data_dir() -> PathBuf {
    roaming_dir()
}
