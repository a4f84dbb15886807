//! Path management for Moneybags
//!
//! ## Path Resolution Order
//!
//! 1. `MONEYBAGS_DATA_DIR` environment variable (if set)
//! 2. The platform configuration directory (`~/.config/moneybags` on Linux,
//!    `~/Library/Application Support/moneybags` on macOS, `%APPDATA%\moneybags`
//!    on Windows)

use std::path::PathBuf;

use directories::BaseDirs;

use crate::error::MoneybagsError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "MONEYBAGS_DATA_DIR";

/// Manages all paths used by Moneybags
#[derive(Debug, Clone)]
pub struct MoneybagsPaths {
    base_dir: PathBuf,
}

impl MoneybagsPaths {
    /// Create a new MoneybagsPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, MoneybagsError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create MoneybagsPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the SQLite database
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Directory holding exports written by the CLI
    pub fn export_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Default location of the SQLite database file
    pub fn database_file(&self) -> PathBuf {
        self.data_dir().join("moneybags.db")
    }

    /// Default database URL pointing at [`Self::database_file`]
    pub fn default_database_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.database_file().display())
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), MoneybagsError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| MoneybagsError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| MoneybagsError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.export_dir()).map_err(|e| {
            MoneybagsError::Io(format!("Failed to create export directory: {}", e))
        })?;

        Ok(())
    }

    /// Check if Moneybags has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, MoneybagsError> {
    let dirs = BaseDirs::new()
        .ok_or_else(|| MoneybagsError::Config("Could not determine home directory".into()))?;
    Ok(dirs.config_dir().join("moneybags"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneybagsPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(
            paths.database_file(),
            temp_dir.path().join("data").join("moneybags.db")
        );
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var(DATA_DIR_ENV, temp_dir.path());

        let paths = MoneybagsPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());

        std::env::remove_var(DATA_DIR_ENV);
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneybagsPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.export_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_default_database_url() {
        let paths = MoneybagsPaths::with_base_dir(PathBuf::from("/tmp/mb"));
        assert_eq!(
            paths.default_database_url(),
            "sqlite:///tmp/mb/data/moneybags.db?mode=rwc"
        );
    }
}
