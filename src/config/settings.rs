//! Application settings for Moneybags
//!
//! Settings live in `config.json` next to the data directory and cover the
//! process-level concerns: database connection, HTTP bind address and
//! logging. User preferences such as the currency format are stored in the
//! database configuration table instead.

use serde::{Deserialize, Serialize};

use super::paths::MoneybagsPaths;
use crate::error::MoneybagsError;

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite URL; `None` means the default file in the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Maximum pooled connections
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Seconds to wait for a free connection before reporting unavailability
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: default_pool_size(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

impl DatabaseSettings {
    /// The URL to connect to, falling back to the data directory file
    pub fn resolved_url(&self, paths: &MoneybagsPaths) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| paths.default_database_url())
    }
}

/// Logging preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Default filter directive when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Settings for Moneybags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Address the web server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub logging: LogSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_pool_size() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "moneybags=info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            bind_address: default_bind_address(),
            database: DatabaseSettings::default(),
            logging: LogSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &MoneybagsPaths) -> Result<Self, MoneybagsError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                MoneybagsError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                MoneybagsError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &MoneybagsPaths) -> Result<(), MoneybagsError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            MoneybagsError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            MoneybagsError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}
