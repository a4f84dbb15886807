//! Configuration key/value model
//!
//! User-editable preferences stored in the database. Well-known keys are
//! listed here; unknown keys are stored as given.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::ConfigEntryId;

/// Display currency (`nok`, `usd`, `eur`)
pub const CURRENCY_FORMAT_KEY: &str = "currency_format";

/// Comma-separated category ids shown in the dashboard budget widget
pub const MONITORED_CATEGORIES_KEY: &str = "dashboard_monitored_categories";

/// Set once the starter data has been written
pub const DATABASE_SEEDED_KEY: &str = "database_seeded";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub id: ConfigEntryId,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConfigEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConfigEntryId::new(),
            key: key.into(),
            value: value.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Split a comma-separated list value, dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
