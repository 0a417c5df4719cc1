// Linkbook platform paths for Linux
// Config: ~/.config/linkbook
// Data:   ~/.local/share/linkbook

use std::env;
use std::path::PathBuf;

/// Returns the configuration directory for Linkbook on Linux.
/// Uses `$XDG_CONFIG_HOME/linkbook` if set, otherwise `~/.config/linkbook`.
pub fn get_config_dir() -> PathBuf {
    xdg_dir(env::var("XDG_CONFIG_HOME").ok(), &[".config"])
}

/// Returns the data directory for Linkbook on Linux.
/// Uses `$XDG_DATA_HOME/linkbook` if set, otherwise `~/.local/share/linkbook`.
pub fn get_data_dir() -> PathBuf {
    xdg_dir(env::var("XDG_DATA_HOME").ok(), &[".local", "share"])
}

fn xdg_dir(xdg: Option<String>, fallback: &[&str]) -> PathBuf {
    match xdg {
        Some(base) => PathBuf::from(base).join("linkbook"),
        None => {
            let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
            fallback
                .iter()
                .fold(PathBuf::from(home), |path, part| path.join(part))
                .join("linkbook")
        }
    }
}
