//! User settings and where they are loaded from.

use crate::input::{Hotkey, HotkeyError};
use crate::layout::{KeyboardLayout, Language};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name of the settings file.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Environment variable overriding the settings file location.
pub const SETTINGS_PATH_ENV: &str = "MOUSELESS_SETTINGS";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid hotkey {0:?}: {1}")]
    InvalidHotkey(String, HotkeyError),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_show_hotkey")]
    pub show_hotkey: String,
    #[serde(default = "default_quit_hotkey")]
    pub quit_hotkey: String,
}

fn default_language() -> String {
    "EN".into()
}

fn default_show_hotkey() -> String {
    "ctrl+alt+g".into()
}

fn default_quit_hotkey() -> String {
    "ctrl+alt+q".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: default_language(),
            show_hotkey: default_show_hotkey(),
            quit_hotkey: default_quit_hotkey(),
        }
    }
}

impl Settings {
    pub fn language(&self) -> Language {
        Language::from_code(&self.language)
    }

    /// Inner-grid layout for the configured language.
    pub fn keyboard_layout(&self) -> KeyboardLayout {
        KeyboardLayout::for_language(self.language())
    }

    pub fn show_hotkey(&self) -> SettingsResult<Hotkey> {
        parse_hotkey(&self.show_hotkey)
    }

    pub fn quit_hotkey(&self) -> SettingsResult<Hotkey> {
        parse_hotkey(&self.quit_hotkey)
    }
}

fn parse_hotkey(s: &str) -> SettingsResult<Hotkey> {
    s.parse()
        .map_err(|e| SettingsError::InvalidHotkey(s.to_string(), e))
}

/// Get the per-user config directory for mouseless.
pub fn get_config_dir() -> PathBuf {
    let base = dirs_next::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("mouseless")
}

/// Where settings are read from.
///
/// `MOUSELESS_SETTINGS` wins; otherwise a `settings.json` next to the
/// executable, then the per-user config directory.
pub fn settings_path() -> PathBuf {
    if let Some(path) = std::env::var_os(SETTINGS_PATH_ENV) {
        return PathBuf::from(path);
    }

    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(SETTINGS_FILE_NAME)));
    match beside_exe {
        Some(path) if path.exists() => path,
        _ => get_config_dir().join(SETTINGS_FILE_NAME),
    }
}

/// Read settings from a file.
pub fn load_settings_from(path: &Path) -> SettingsResult<Settings> {
    let json = fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&json)?;
    debug!(?path, "Loaded settings");
    Ok(settings)
}

/// Load settings, falling back to defaults if the file is missing or broken.
pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        debug!(?path, "No settings file, using defaults");
        return Settings::default();
    }

    match load_settings_from(&path) {
        Ok(settings) => {
            info!(?path, "Loaded user settings");
            settings
        }
        Err(e) => {
            warn!(?path, error = %e, "Failed to load settings, using defaults");
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyInput;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.language(), Language::English);
        assert_eq!(settings.keyboard_layout(), KeyboardLayout::english());
        assert_eq!(settings.show_hotkey().unwrap().key, KeyInput::Char('g'));
        assert_eq!(settings.quit_hotkey().unwrap().key, KeyInput::Char('q'));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"language": "PT-BR"}"#).unwrap();
        assert_eq!(settings.language(), Language::Brazilian);
        assert_eq!(settings.keyboard_layout().key_at(1, 7), Some('ç'));
        assert_eq!(settings.show_hotkey, "ctrl+alt+g");
    }

    #[test]
    fn test_invalid_hotkey() {
        let settings = Settings {
            show_hotkey: "ctrl+".into(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.show_hotkey(),
            Err(SettingsError::InvalidHotkey(_, HotkeyError::MissingKey(_)))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(
            &path,
            r#"{"language": "BR", "show_hotkey": "meta+space", "quit_hotkey": "ctrl+shift+f4"}"#,
        )
        .unwrap();

        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded.language(), Language::Brazilian);
        assert_eq!(loaded.show_hotkey().unwrap().key, KeyInput::Space);
        assert_eq!(loaded.quit_hotkey().unwrap().key, KeyInput::Function(4));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_settings_from(&path),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        assert!(matches!(load_settings_from(&path), Err(SettingsError::Io(_))));
    }
}
