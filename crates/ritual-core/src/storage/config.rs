//! TOML-based application configuration.
//!
//! Stores the identity key the CLI resolves to a local user and the
//! timezone offset used to derive "today".
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;

/// Application configuration.
///
/// Serialized to/from TOML; missing keys fall back to defaults so old
/// config files keep working.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Identity key resolved to a local user by the CLI.
    #[serde(default = "default_user")]
    pub default_user: String,
    /// Hour offset from UTC for the calendar-day boundary.
    #[serde(default)]
    pub timezone_offset_hours: i32,
}

fn default_user() -> String {
    "local".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_user: default_user(),
            timezone_offset_hours: 0,
        }
    }
}

impl Config {
    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("<data dir>"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file
    /// does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Persist the configuration.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        self.save_to(&path)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.default_user, "local");
        assert_eq!(config.timezone_offset_hours, 0);
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            default_user: "tester".to_string(),
            timezone_offset_hours: 9,
        };
        config.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.default_user, "tester");
        assert_eq!(reloaded.timezone_offset_hours, 9);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timezone_offset_hours = -5\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_user, "local");
        assert_eq!(config.timezone_offset_hours, -5);
    }
}
