//! Configuration loading for mailsift applications
//!
//! Provides utilities for loading configuration files from the shared
//! mailsift config directory (~/.config/mailsift/), plus the panel
//! settings file and the path of the durable state database.
//!
//! Call [`init`] at application startup to bootstrap the config directory.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings filename in the mailsift config directory
const SETTINGS_FILE: &str = "settings.json";

/// Durable state database filename in the mailsift config directory
const STATE_DB_FILE: &str = "state.db";

/// Default prediction service base URL used when no settings file exists
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Initialize the mailsift config directory.
///
/// Creates ~/.config/mailsift/ if it doesn't exist.
/// Call this once at application startup.
pub fn init() -> Result<PathBuf> {
    ensure_config_dir()
}

/// Get the mailsift config directory (~/.config/mailsift/)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mailsift"))
}

/// Get the path to a config file within the mailsift config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    config_dir().map(|p| p.join(filename))
}

/// Get the path of the durable shared-state database
///
/// The panel opens its sqlite-backed state store here so controller state
/// survives panel teardown.
pub fn state_db_path() -> Result<PathBuf> {
    let dir = ensure_config_dir()?;
    Ok(dir.join(STATE_DB_FILE))
}

/// Load and parse a JSON config file from the mailsift config directory
pub fn load_json<T: DeserializeOwned>(filename: &str) -> Result<T> {
    let path = config_path(filename).context("Could not determine config directory")?;
    load_json_file(&path)
}

/// Load and parse a JSON file from an arbitrary path
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Check if a config file exists in the mailsift config directory
pub fn config_exists(filename: &str) -> bool {
    config_path(filename).is_some_and(|p| p.exists())
}

/// Ensure the mailsift config directory exists
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir().context("Could not determine config directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

/// Save a value as JSON to a config file in the mailsift config directory
pub fn save_json<T: Serialize>(filename: &str, value: &T) -> Result<()> {
    let dir = ensure_config_dir()?;
    let path = dir.join(filename);
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

/// Panel settings persisted in ~/.config/mailsift/settings.json
///
/// Only used to seed the shared store on first run; afterwards the store's
/// `apiBase` key is the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub api_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the config directory, falling back to defaults
    /// when the file is absent or unreadable.
    pub fn load_or_default() -> Self {
        if config_exists(SETTINGS_FILE) {
            load_json(SETTINGS_FILE).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<()> {
        save_json(SETTINGS_FILE, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let dir = config_dir();
        assert!(dir.is_some());
        assert!(dir.unwrap().ends_with("mailsift"));
    }

    #[test]
    fn test_config_path() {
        let path = config_path("test.json");
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.ends_with("mailsift/test.json"));
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_load_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            api_base: "http://10.0.0.5:9000".to_string(),
        };
        std::fs::write(&path, serde_json::to_string(&settings).unwrap()).unwrap();

        let loaded: Settings = load_json_file(&path).unwrap();
        assert_eq!(loaded.api_base, "http://10.0.0.5:9000");
    }
}
