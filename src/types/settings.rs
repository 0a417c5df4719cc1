use serde::{Deserialize, Serialize};

use crate::platform;

/// Top-level linkbook settings, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkbookSettings {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub display: DisplaySettings,
}

impl Default for LinkbookSettings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_filter: default_log_filter(),
            display: DisplaySettings::default(),
        }
    }
}

/// Labels and limits the UI layer renders with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplaySettings {
    /// Name of the synthetic group holding every pinned link.
    pub pinned_root_name: String,
    /// Label of the "no group" choice in the save dialog.
    pub ungrouped_label: String,
    /// How many pinned links get a Ctrl+digit shortcut.
    pub quick_nav_limit: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            pinned_root_name: "Links".to_string(),
            ungrouped_label: "All Links".to_string(),
            quick_nav_limit: 9,
        }
    }
}

fn default_database_path() -> String {
    platform::get_data_dir()
        .join("linkbook.db")
        .to_string_lossy()
        .to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}
