//! Daemon settings persistence
//!
//! Ports and tuning knobs, stored as JSON under the platform config
//! directory. Missing or unreadable files fall back to the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::lyrics::display::DEFAULT_MAX_DISPLAY_SEC;

/// Daemon settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// UDP port the OSC listener binds
    #[serde(default = "default_osc_port")]
    pub osc_port: u16,
    /// TCP port the WebSocket server binds
    #[serde(default = "default_ws_port")]
    pub ws_port: u16,
    /// Ceiling on how long a line stays visible with no successor, seconds
    #[serde(default = "default_max_display_sec")]
    pub max_display_sec: f64,
    /// Override for the lyrics cache directory
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_osc_port() -> u16 {
    3170
}

fn default_ws_port() -> u16 {
    8081
}

fn default_max_display_sec() -> f64 {
    DEFAULT_MAX_DISPLAY_SEC
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            osc_port: default_osc_port(),
            ws_port: default_ws_port(),
            max_display_sec: default_max_display_sec(),
            cache_dir: None,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "lyricast", "Lyricast")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return defaults if not found
    pub fn load() -> Self {
        Self::file_path()
            .and_then(|path| Self::load_from_file(&path).ok())
            .unwrap_or_default()
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SettingsError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Save settings to a specific file
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Io(e.to_string()))?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| SettingsError::Io(e.to_string()))?;
        Ok(())
    }

    /// Directory holding cached lyric lookups
    pub fn lyrics_cache_dir(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("lyricast")
                .join("lyrics"),
        }
    }
}

/// Errors that can occur with settings
#[derive(Debug, Clone)]
pub enum SettingsError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.osc_port, 3170);
        assert_eq!(settings.ws_port, 8081);
        assert_eq!(settings.max_display_sec, 10.0);
        assert!(settings.cache_dir.is_none());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings {
            osc_port: 9001,
            ws_port: 9002,
            max_display_sec: 7.5,
            cache_dir: Some(dir.path().join("cache")),
        };
        settings.save_to_file(&path).unwrap();

        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded.osc_port, 9001);
        assert_eq!(loaded.ws_port, 9002);
        assert_eq!(loaded.max_display_sec, 7.5);
        assert_eq!(loaded.lyrics_cache_dir(), dir.path().join("cache"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load_from_file(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"oscPort": 4000}"#).unwrap();

        // Unknown casing is ignored, absent fields default.
        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded.osc_port, 3170);

        std::fs::write(&path, r#"{"osc_port": 4000}"#).unwrap();
        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded.osc_port, 4000);
        assert_eq!(loaded.ws_port, 8081);
    }
}
