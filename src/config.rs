//! Configuration file support.
//!
//! Settings are stored as JSON in the platform config directory and hold the
//! log level, the tool a fresh session starts with and the tool hotkeys.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::keybindings::HotkeyBindings;
use crate::model::CanvasTool;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Tool hotkeys
    #[serde(default)]
    pub hotkeys: HotkeyBindings,
}

fn default_app_name() -> String {
    "imgnotate".to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Tool selected when a session starts without one
    #[serde(default)]
    pub default_tool: CanvasTool,

    /// Folder opened last, used when none is given
    #[serde(default)]
    pub last_folder: Option<PathBuf>,
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            hotkeys: HotkeyBindings::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "imgnotate-config.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("imgnotate").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("imgnotate")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save configuration to a file, creating parent directories if needed.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load configuration from a file that may not exist yet.
    /// Returns `Ok(None)` if there is no file at `path`.
    pub fn load_if_exists(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return Ok(None);
        }
        let config = Self::load_from_file(path)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(Some(config))
    }

    /// Try to load configuration from the default path.
    /// Returns `Ok(None)` if there is no config directory or no file.
    pub fn load_from_default_path() -> Result<Option<Self>, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_if_exists(&path),
            None => Ok(None),
        }
    }

    /// Apply `change` to the configuration stored at `path` and save it.
    ///
    /// A missing file starts from defaults. A file that fails to load is left
    /// untouched and the load error is returned.
    pub fn update_file(path: &Path, change: impl FnOnce(&mut Self)) -> Result<(), ConfigError> {
        let mut config = Self::load_if_exists(path)?.unwrap_or_default();
        change(&mut config);
        config.save_to_file(path)
    }

    /// [`AppConfig::update_file`] on the default path.
    pub fn update_default_path(change: impl FnOnce(&mut Self)) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        Self::update_file(&path, change)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.preferences.default_tool, CanvasTool::Line);
        assert_eq!(config.preferences.log_level, LogLevel::Info);
        assert_eq!(config.hotkeys, HotkeyBindings::default());
    }

    #[test]
    fn test_json_keeps_settings() {
        let mut config = AppConfig::new();
        config.preferences.log_level = LogLevel::Debug;
        config.preferences.default_tool = CanvasTool::Polygon;
        config.hotkeys.set_tool_key(CanvasTool::Line, "1");

        let json = config.to_json().unwrap();
        assert!(json.contains("\"debug\""));
        assert!(json.contains("\"polygon\""));

        let loaded = AppConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_minimal_json_fills_defaults() {
        let config = AppConfig::from_json(r#"{"version": 1}"#).unwrap();
        assert_eq!(config.app_name, "imgnotate");
        assert_eq!(config.hotkeys.rectangle, "r");
        assert_eq!(config.preferences.last_folder, None);
    }

    #[test]
    fn test_rejects_newer_version() {
        let err = AppConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                supported_version: CONFIG_VERSION
            }
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            AppConfig::from_json("{ not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(AppConfig::default_filename());

        let mut config = AppConfig::new();
        config.preferences.last_folder = Some(PathBuf::from("/data/frames"));
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_if_exists_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(AppConfig::default_filename());
        assert!(AppConfig::load_if_exists(&path).unwrap().is_none());
    }

    #[test]
    fn test_update_file_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(AppConfig::default_filename());

        AppConfig::update_file(&path, |config| {
            config.preferences.last_folder = Some(PathBuf::from("/data/frames"));
        })
        .unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.preferences.last_folder, Some(PathBuf::from("/data/frames")));
        assert_eq!(loaded.hotkeys, HotkeyBindings::default());
    }

    #[test]
    fn test_update_file_keeps_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(AppConfig::default_filename());
        std::fs::write(
            &path,
            r#"{"version": 1, "hotkeys": {"line": "1", "rectangle": "2", "polygon": "3"}}"#,
        )
        .unwrap();

        AppConfig::update_file(&path, |config| {
            config.preferences.last_folder = Some(PathBuf::from("/data/frames"));
        })
        .unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.hotkeys.line, "1");
        assert_eq!(loaded.hotkeys.polygon, "3");
        assert_eq!(loaded.preferences.last_folder, Some(PathBuf::from("/data/frames")));
    }

    #[test]
    fn test_update_file_leaves_rejected_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let newer = dir.path().join("newer.json");
        let broken = dir.path().join("broken.json");
        let newer_json = r#"{"version": 99}"#;
        let broken_json = "{ not json";
        std::fs::write(&newer, newer_json).unwrap();
        std::fs::write(&broken, broken_json).unwrap();

        let result = AppConfig::update_file(&newer, |config| {
            config.preferences.last_folder = Some(PathBuf::from("/data/frames"));
        });
        assert!(matches!(result, Err(ConfigError::VersionTooNew { .. })));
        assert_eq!(std::fs::read_to_string(&newer).unwrap(), newer_json);

        let result = AppConfig::update_file(&broken, |_| {});
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
        assert_eq!(std::fs::read_to_string(&broken).unwrap(), broken_json);
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
    }
}
