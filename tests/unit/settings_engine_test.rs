//! Unit tests for the settings engine: load, save, dot-notation updates, reset.

use std::fs;

use linkbook::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use linkbook::types::settings::LinkbookSettings;
use tempfile::TempDir;

fn setup() -> (SettingsEngine, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let path = tmp.path().join("settings.json").to_string_lossy().to_string();
    (SettingsEngine::new(Some(path)), tmp)
}

#[test]
fn test_load_defaults_when_no_file() {
    let (mut engine, _tmp) = setup();
    let settings = engine.load().unwrap();
    assert_eq!(settings, LinkbookSettings::default());
}

#[test]
fn test_default_settings_values() {
    let defaults = LinkbookSettings::default();
    assert_eq!(defaults.log_filter, "info");
    assert!(defaults.database_path.ends_with("linkbook.db"));
    assert_eq!(defaults.display.pinned_root_name, "Links");
    assert_eq!(defaults.display.ungrouped_label, "All Links");
    assert_eq!(defaults.display.quick_nav_limit, 9);
}

#[test]
fn test_save_and_load_roundtrip() {
    let (mut engine, tmp) = setup();
    engine.load().unwrap();
    engine
        .set_value("display.pinned_root_name", serde_json::json!("Favourites"))
        .unwrap();

    let path = tmp.path().join("settings.json").to_string_lossy().to_string();
    let mut reloaded = SettingsEngine::new(Some(path));
    let loaded = reloaded.load().unwrap();
    assert_eq!(loaded.display.pinned_root_name, "Favourites");
}

#[test]
fn test_set_value_dot_notation() {
    let (mut engine, _tmp) = setup();
    engine.load().unwrap();

    engine.set_value("log_filter", serde_json::json!("debug")).unwrap();
    engine.set_value("display.quick_nav_limit", serde_json::json!(5)).unwrap();

    assert_eq!(engine.get_settings().log_filter, "debug");
    assert_eq!(engine.get_settings().display.quick_nav_limit, 5);
}

#[test]
fn test_set_value_invalid_key() {
    let (mut engine, _tmp) = setup();
    engine.load().unwrap();
    assert!(engine.set_value("display.nonexistent", serde_json::json!(true)).is_err());
    assert!(engine.set_value("nonexistent.key", serde_json::json!(true)).is_err());
    assert!(engine.set_value("log_filter.deeper", serde_json::json!(true)).is_err());
}

#[test]
fn test_set_value_empty_key() {
    let (mut engine, _tmp) = setup();
    engine.load().unwrap();
    assert!(engine.set_value("", serde_json::json!(true)).is_err());
}

#[test]
fn test_set_value_invalid_value_type_keeps_settings() {
    let (mut engine, _tmp) = setup();
    engine.load().unwrap();
    let result = engine.set_value("display.quick_nav_limit", serde_json::json!("nine"));
    assert!(result.is_err());
    assert_eq!(engine.get_settings().display.quick_nav_limit, 9);
}

#[test]
fn test_reset_restores_defaults() {
    let (mut engine, _tmp) = setup();
    engine.load().unwrap();
    engine.set_value("log_filter", serde_json::json!("trace")).unwrap();

    engine.reset().unwrap();
    assert_eq!(*engine.get_settings(), LinkbookSettings::default());
}

#[test]
fn test_load_malformed_json() {
    let (mut engine, _tmp) = setup();
    fs::write(engine.get_config_path(), "{ invalid json }").unwrap();
    assert!(engine.load().is_err());
}

#[test]
fn test_partial_file_fills_defaults() {
    let (mut engine, _tmp) = setup();
    fs::write(
        engine.get_config_path(),
        r#"{"display": {"quick_nav_limit": 3}}"#,
    )
    .unwrap();

    let settings = engine.load().unwrap();
    assert_eq!(settings.display.quick_nav_limit, 3);
    assert_eq!(settings.display.pinned_root_name, "Links");
    assert_eq!(settings.log_filter, "info");
}
