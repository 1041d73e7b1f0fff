//! Configuration management for db-sift.
//!
//! Handles loading configuration from TOML files and environment variables,
//! covering the database location and export defaults.

use crate::error::{Result, SiftError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that names the database file.
pub const DATABASE_ENV_VAR: &str = "SIFT_DATABASE";

/// Main configuration structure for db-sift.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Database location and open options.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Export defaults.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite file. `None` means a private in-memory database.
    pub path: Option<PathBuf>,

    /// Create the file when it does not exist.
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,

    /// How long to wait on a locked database before failing.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_create_if_missing() -> bool {
    true
}

fn default_busy_timeout_secs() -> u64 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            create_if_missing: default_create_if_missing(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}

impl DatabaseConfig {
    /// Creates a config for the SQLite file at `path` with default options.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Merges another config into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &DatabaseConfig) {
        if other.path.is_some() {
            self.path = other.path.clone();
        }
        if other.create_if_missing != default_create_if_missing() {
            self.create_if_missing = other.create_if_missing;
        }
        if other.busy_timeout_secs != default_busy_timeout_secs() {
            self.busy_timeout_secs = other.busy_timeout_secs;
        }
    }

    /// Applies `SIFT_DATABASE` as the path when none is set.
    pub fn apply_env_defaults(&mut self) {
        if self.path.is_none() {
            self.path = std::env::var(DATABASE_ENV_VAR).ok().map(PathBuf::from);
        }
    }

    /// Returns a display string for logs and messages.
    pub fn display_string(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => ":memory:".to_string(),
        }
    }
}

/// Export defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Format used when none is given on the command line.
    #[serde(default = "default_export_format")]
    pub format: String,

    /// Directory that receives exports written to a default path.
    pub directory: Option<PathBuf>,
}

fn default_export_format() -> String {
    "csv".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_export_format(),
            directory: None,
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("db-sift")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SiftError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            SiftError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
