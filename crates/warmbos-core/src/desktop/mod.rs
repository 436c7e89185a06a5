//! Desktop configuration documents.
//!
//! The web UI owns the shape of `shortcuts.json` and `settings.json`; the
//! backend only checks enough structure to keep a broken client from wiping
//! them, and persists them atomically.

mod defaults;

pub use defaults::{default_settings, default_shortcuts};

use crate::atomic::{atomic_write_json, read_json};
use crate::config::DesktopPaths;
use crate::{Result, WarmbosError};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

/// Keys of which a settings document must contain at least one.
const SETTINGS_KEYS: &[&str] = &["backgroundImage", "preferences"];

/// Reads and writes the desktop configuration documents.
#[derive(Debug, Clone)]
pub struct DesktopConfigStore {
    paths: DesktopPaths,
}

impl DesktopConfigStore {
    pub fn new(paths: DesktopPaths) -> Self {
        Self { paths }
    }

    /// Create the client directory layout.
    pub fn ensure_directory_structure(&self) -> Result<()> {
        for dir in self.paths.required_dirs() {
            fs::create_dir_all(&dir).map_err(|e| WarmbosError::io_with_path(e, &dir))?;
        }
        Ok(())
    }

    /// Write default settings and shortcuts where none exist yet.
    pub fn create_default_files(&self) -> Result<()> {
        write_default(&self.paths.settings_file(), &default_settings())?;
        write_default(&self.paths.shortcuts_file(), &default_shortcuts())?;
        Ok(())
    }

    pub fn load_shortcuts(&self) -> Result<Value> {
        load_document(&self.paths.shortcuts_file())
    }

    pub fn load_settings(&self) -> Result<Value> {
        load_document(&self.paths.settings_file())
    }

    pub fn save_shortcuts(&self, data: &Value) -> Result<()> {
        validate_shortcuts(data)?;
        atomic_write_json(&self.paths.shortcuts_file(), data)
    }

    pub fn save_settings(&self, data: &Value) -> Result<()> {
        validate_settings(data)?;
        atomic_write_json(&self.paths.settings_file(), data)
    }
}

fn write_default(path: &Path, value: &Value) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    atomic_write_json(path, value)?;
    info!("Created default {}", path.display());
    Ok(())
}

fn load_document(path: &Path) -> Result<Value> {
    read_json(path)?.ok_or_else(|| WarmbosError::FileNotFound(path.to_path_buf()))
}

/// Shortcuts must be a non-empty object.
pub fn validate_shortcuts(data: &Value) -> Result<()> {
    match data.as_object() {
        Some(map) if !map.is_empty() => Ok(()),
        Some(_) => Err(WarmbosError::validation("shortcuts", "No data provided")),
        None => Err(WarmbosError::validation("shortcuts", "Shortcuts must be an object")),
    }
}

/// Settings must be a non-empty object with at least one known key; a
/// non-empty `backgroundImage` must be an http(s) or root-relative URL and a
/// non-empty `preferences` must be an object.
pub fn validate_settings(data: &Value) -> Result<()> {
    let map = match data.as_object() {
        Some(map) if !map.is_empty() => map,
        Some(_) => return Err(WarmbosError::validation("settings", "No data provided")),
        None => return Err(WarmbosError::validation("settings", "Settings must be an object")),
    };

    if !SETTINGS_KEYS.iter().any(|k| map.contains_key(*k)) {
        return Err(WarmbosError::validation("settings", "Invalid settings structure"));
    }

    if let Some(background) = map.get("backgroundImage").filter(|v| is_truthy(v)) {
        let allowed = background.as_str().map(str::trim).is_some_and(|url| {
            url.is_empty()
                || url.starts_with("http://")
                || url.starts_with("https://")
                || url.starts_with('/')
        });
        if !allowed {
            return Err(WarmbosError::validation(
                "backgroundImage",
                "Invalid background image URL",
            ));
        }
    }

    if let Some(prefs) = map.get("preferences").filter(|v| is_truthy(v)) {
        if !prefs.is_object() {
            return Err(WarmbosError::validation(
                "preferences",
                "Preferences must be an object",
            ));
        }
    }

    Ok(())
}

/// Empty strings, empty containers, `false`, `0` and `null` count as unset.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, DesktopConfigStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = DesktopConfigStore::new(DesktopPaths::new(temp_dir.path()));
        (temp_dir, store)
    }

    #[test]
    fn test_defaults_created_once() {
        let (_temp_dir, store) = store();
        store.ensure_directory_structure().unwrap();
        store.create_default_files().unwrap();

        let settings = store.load_settings().unwrap();
        assert_eq!(settings["preferences"]["theme"], "dark");
        let shortcuts = store.load_shortcuts().unwrap();
        assert_eq!(shortcuts["desktop"].as_array().unwrap().len(), 3);
        assert_eq!(shortcuts["startMenu"][0]["title"], "My Computer");

        store
            .save_settings(&json!({"preferences": {"theme": "light"}}))
            .unwrap();
        store.create_default_files().unwrap();
        assert_eq!(store.load_settings().unwrap()["preferences"]["theme"], "light");
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let (_temp_dir, store) = store();
        assert!(matches!(
            store.load_shortcuts(),
            Err(WarmbosError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_save_shortcuts_roundtrip() {
        let (_temp_dir, store) = store();
        let doc = json!({"desktop": [], "taskbar": [{"title": "Notes"}], "startMenu": []});
        store.save_shortcuts(&doc).unwrap();
        assert_eq!(store.load_shortcuts().unwrap(), doc);
    }

    #[test]
    fn test_shortcuts_validation() {
        assert!(validate_shortcuts(&json!({"desktop": []})).is_ok());
        assert!(validate_shortcuts(&json!({})).is_err());
        assert!(validate_shortcuts(&json!([1, 2])).is_err());
        assert!(validate_shortcuts(&Value::Null).is_err());
    }

    #[test]
    fn test_settings_validation() {
        assert!(validate_settings(&json!({"backgroundImage": "https://example.com/a.png"})).is_ok());
        assert!(validate_settings(&json!({"backgroundImage": "/wallpapers/a.png"})).is_ok());
        assert!(validate_settings(&json!({"backgroundImage": ""})).is_ok());
        assert!(validate_settings(&json!({"preferences": {}})).is_ok());

        assert!(validate_settings(&json!({"theme": "dark"})).is_err());
        assert!(validate_settings(&json!({"backgroundImage": "ftp://example.com/a.png"})).is_err());
        assert!(validate_settings(&json!({"preferences": "dark"})).is_err());
        assert!(validate_settings(&json!({})).is_err());
    }

    #[test]
    fn test_invalid_settings_not_written() {
        let (_temp_dir, store) = store();
        store.create_default_files().unwrap();
        let err = store
            .save_settings(&json!({"backgroundImage": "javascript:alert(1)"}))
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            store.load_settings().unwrap(),
            default_settings()
        );
    }
}
