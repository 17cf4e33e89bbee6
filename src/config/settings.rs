//! Configuration settings for boardsync.
//!
//! Settings are loaded from `~/.boardsync/config.yaml`. Every field has a
//! default, so a partial file only overrides what it names.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::error::BoardsyncError;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Remote endpoint settings.
    pub remote: RemoteConfig,
    /// Sync queue settings.
    pub sync: SyncConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

/// Where and how to reach the project service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the project service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the idempotent write endpoint.
    #[serde(default = "default_sync_path")]
    pub sync_path: String,
    /// Path probed to decide whether the service is reachable.
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// Bearer token sent with every submission.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Upper bound on a single submission, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Upper bound on a connectivity probe, in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

/// Sync queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Failed attempts after which an entry is dead-lettered.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Seconds between background drains in `sync watch`.
    #[serde(default = "default_background_interval")]
    pub background_interval_secs: u64,
    /// Seconds between connectivity probes in `sync watch`.
    #[serde(default = "default_probe_interval")]
    pub probe_interval_secs: u64,
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_sync_path() -> String {
    "/api/sync".to_string()
}

fn default_health_path() -> String {
    "/api/health".to_string()
}

const fn default_request_timeout() -> u64 {
    10
}

const fn default_probe_timeout() -> u64 {
    3
}

const fn default_max_attempts() -> u32 {
    5
}

const fn default_background_interval() -> u64 {
    60
}

const fn default_probe_interval() -> u64 {
    5
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sync_path: default_sync_path(),
            health_path: default_health_path(),
            auth_token: None,
            request_timeout_secs: default_request_timeout(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            background_interval_secs: default_background_interval(),
            probe_interval_secs: default_probe_interval(),
        }
    }
}

impl RemoteConfig {
    /// Full URL of the write endpoint.
    #[must_use]
    pub fn sync_url(&self) -> String {
        join_url(&self.base_url, &self.sync_path)
    }

    /// Full URL of the health probe.
    #[must_use]
    pub fn health_url(&self) -> String {
        join_url(&self.base_url, &self.health_path)
    }

    /// Submission timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Probe timeout.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl SyncConfig {
    /// Interval between background drains.
    #[must_use]
    pub const fn background_interval(&self) -> Duration {
        Duration::from_secs(self.background_interval_secs)
    }

    /// Interval between connectivity probes.
    #[must_use]
    pub const fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, BoardsyncError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            BoardsyncError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            BoardsyncError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), BoardsyncError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| BoardsyncError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            BoardsyncError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Serialize to YAML for display.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, BoardsyncError> {
        serde_yaml::to_string(self)
            .map_err(|e| BoardsyncError::Config(format!("Failed to serialize config: {e}")))
    }

    fn validate(&self) -> Result<(), BoardsyncError> {
        if self.sync.max_attempts == 0 {
            return Err(BoardsyncError::Config(
                "sync.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.remote.request_timeout_secs == 0 {
            return Err(BoardsyncError::Config(
                "remote.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.general.default_output, OutputFormat::Pretty);
        assert_eq!(config.general.color, ColorSetting::Auto);
        assert_eq!(config.remote.base_url, "http://localhost:3000");
        assert_eq!(config.remote.request_timeout_secs, 10);
        assert_eq!(config.sync.max_attempts, 5);
        assert!(config.remote.auth_token.is_none());
    }

    #[test]
    fn test_urls() {
        let mut remote = RemoteConfig::default();
        remote.base_url = "https://pm.example.com/".to_string();

        assert_eq!(remote.sync_url(), "https://pm.example.com/api/sync");
        assert_eq!(remote.health_url(), "https://pm.example.com/api/health");
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let config = Config::load_from_path(&config_path).unwrap();

        assert_eq!(config.general.default_output, OutputFormat::Pretty);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut config = Config::default();
        config.sync.max_attempts = 8;
        config.remote.auth_token = Some("secret".to_string());

        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();

        assert_eq!(loaded.sync.max_attempts, 8);
        assert_eq!(loaded.remote.auth_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let partial_yaml = r"
remote:
  base_url: http://10.0.0.2:8080
";
        std::fs::write(&config_path, partial_yaml).unwrap();

        let config = Config::load_from_path(&config_path).unwrap();

        assert_eq!(config.remote.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.remote.sync_path, "/api/sync");
        assert_eq!(config.sync.probe_interval_secs, 5);
    }

    #[test]
    fn test_zero_max_attempts_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "sync:\n  max_attempts: 0\n").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(matches!(err, BoardsyncError::Config(_)));
    }
}
