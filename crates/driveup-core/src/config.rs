//! Configuration module for driveup.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, defaults, and platform-appropriate paths. The
//! configuration is constructed once and passed by value into the client
//! and monitor constructors; there is no ambient global settings lookup.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration for driveup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Folder monitoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between directory polling cycles.
    pub check_folder_interval_seconds: u64,
    /// Lowercase file extensions (with leading dot) eligible for upload.
    pub file_types_to_monitor: HashSet<String>,
}

/// Authentication / OAuth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Path to the OAuth client secrets JSON exported from the provider's
    /// application registration console.
    pub client_secrets: PathBuf,
    /// Path where the reusable token is persisted between sessions.
    pub token_cache: PathBuf,
    /// OAuth scopes to request.
    pub scopes: Vec<String>,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/driveup/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("driveup")
            .join("config.yaml")
    }
}

impl MonitorConfig {
    /// The polling cadence as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.check_folder_interval_seconds)
    }

    /// Returns true if a file with the given extension (including the
    /// leading dot) is eligible for upload. Matching is case-insensitive.
    pub fn monitors_extension(&self, extension: &str) -> bool {
        self.file_types_to_monitor
            .contains(&extension.to_ascii_lowercase())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_folder_interval_seconds: 10,
            file_types_to_monitor: [".mp4", ".png", ".jpg", ".jpeg", ".txt"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("driveup");
        Self {
            client_secrets: config_dir.join("client_secrets.json"),
            token_cache: config_dir.join("reusable_token.json"),
            scopes: vec!["https://www.googleapis.com/auth/drive".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
