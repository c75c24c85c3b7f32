//! Integration-level unit tests for the SettingsEngine public API.
//!
//! These tests exercise the SettingsEngine through its public trait interface,
//! validating default loading, value persistence, and reset behavior.

use linkkeeper::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use linkkeeper::types::errors::SettingsError;
use linkkeeper::types::settings::AppSettings;
use tempfile::TempDir;

/// Helper: create a SettingsEngine backed by a temp directory that lives for the
/// duration of the test (the caller holds the `TempDir` handle).
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("settings.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

/// Without a config file `load()` returns the built-in defaults.
#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.archive.label_prefix, "Archived");
    assert!(settings.archive.expand_restored_link_parent);
    assert_eq!(settings.storage.archive_file, "archive.json");
    assert_eq!(settings.logging.level, "info");
}

/// A change made through `set_value` is visible to a fresh engine on the same file.
#[test]
fn test_set_value_persists_changes() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .set_value("archive.label_prefix", serde_json::json!("Archiv"))
            .unwrap();
        engine
            .set_value("archive.expand_restored_link_parent", serde_json::json!(false))
            .unwrap();
    }

    let mut engine = engine_in_temp(&dir);
    let settings = engine.load().unwrap();
    assert_eq!(settings.archive.label_prefix, "Archiv");
    assert!(!settings.archive.expand_restored_link_parent);
}

#[test]
fn test_set_value_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    assert!(matches!(
        engine.set_value("archive.nope", serde_json::json!(1)),
        Err(SettingsError::InvalidKey(_))
    ));
    assert!(matches!(
        engine.set_value("  ", serde_json::json!(1)),
        Err(SettingsError::InvalidKey(_))
    ));
}

#[test]
fn test_set_value_rejects_wrong_type() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    let result = engine.set_value("archive.expand_restored_link_parent", serde_json::json!("yes"));
    assert!(matches!(result, Err(SettingsError::InvalidValue(_))));
    assert!(engine.get_settings().archive.expand_restored_link_parent);
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();
    engine
        .set_value("logging.level", serde_json::json!("debug"))
        .unwrap();
    engine.reset().unwrap();

    assert_eq!(engine.get_settings(), &AppSettings::default());
    let mut reread = engine_in_temp(&dir);
    assert_eq!(reread.load().unwrap(), AppSettings::default());
}

/// A partial settings file fills the missing sections with defaults.
#[test]
fn test_partial_file_uses_defaults_for_missing_fields() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{"archive": {"label_prefix": "Old"}}"#,
    )
    .unwrap();
    let mut engine = engine_in_temp(&dir);
    let settings = engine.load().unwrap();
    assert_eq!(settings.archive.label_prefix, "Old");
    assert!(settings.archive.expand_restored_link_parent);
    assert_eq!(settings.logging.level, "info");
}

#[test]
fn test_malformed_file_is_serialization_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("settings.json"), "{ nope").unwrap();
    let mut engine = engine_in_temp(&dir);
    assert!(matches!(engine.load(), Err(SettingsError::Serialization(_))));
}
