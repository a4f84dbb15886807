//! Configuration service
//!
//! Reads and writes the key/value preferences in the database, keeping a
//! short-lived in-process snapshot, and tests database connection settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::settings::DatabaseSettings;
use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::configuration::{split_list, CURRENCY_FORMAT_KEY, MONITORED_CATEGORIES_KEY};
use crate::models::{CategoryId, CurrencyFormat};
use crate::storage::{categories, configuration, Storage};

/// Service for configuration values
pub struct ConfigurationService<'a> {
    storage: &'a Storage,
}

impl<'a> ConfigurationService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// All configuration values by key
    pub async fn get_all(&self) -> MoneybagsResult<BTreeMap<String, String>> {
        let cache = self.storage.config_cache();
        if let Some(values) = cache.get().await {
            return Ok(values);
        }
        let generation = cache.generation();

        let mut conn = self.storage.acquire().await?;
        let values: BTreeMap<String, String> = configuration::list(&mut conn)
            .await?
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect();
        debug!(keys = values.len(), "loaded configuration");

        cache.store(generation, values.clone()).await;
        Ok(values)
    }

    /// A single value
    pub async fn get(&self, key: &str) -> MoneybagsResult<Option<String>> {
        Ok(self.get_all().await?.remove(key))
    }

    /// Validate and store each key, then drop the cached snapshot
    pub async fn update(
        &self,
        values: BTreeMap<String, String>,
    ) -> MoneybagsResult<BTreeMap<String, String>> {
        let mut tx = self.storage.begin().await?;

        let mut normalized = BTreeMap::new();
        for (key, value) in values {
            let key = key.trim().to_string();
            if key.is_empty() {
                return Err(MoneybagsError::Validation(
                    "Configuration key cannot be empty".into(),
                ));
            }

            let value = match key.as_str() {
                CURRENCY_FORMAT_KEY => value
                    .parse::<CurrencyFormat>()
                    .map_err(|e| MoneybagsError::Validation(e.to_string()))?
                    .as_str()
                    .to_string(),
                MONITORED_CATEGORIES_KEY => {
                    let mut ids = Vec::new();
                    for raw in split_list(&value) {
                        let id = raw.parse::<CategoryId>().map_err(|_| {
                            MoneybagsError::Validation(format!("Invalid category id '{}'", raw))
                        })?;
                        if categories::get(&mut tx, id).await?.is_none() {
                            warn!(category_id = %id, "monitored category does not exist");
                            return Err(MoneybagsError::category_not_found(raw));
                        }
                        ids.push(id.to_string());
                    }
                    ids.join(",")
                }
                _ => value,
            };
            normalized.insert(key, value);
        }

        for (key, value) in &normalized {
            configuration::set(&mut tx, key, value).await?;
        }
        tx.commit().await?;
        self.storage.config_cache().invalidate();

        info!(keys = ?normalized.keys().collect::<Vec<_>>(), "updated configuration");
        self.get_all().await
    }

    /// The display currency, defaulting when unset or invalid
    pub async fn currency_format(&self) -> MoneybagsResult<CurrencyFormat> {
        Ok(self
            .get(CURRENCY_FORMAT_KEY)
            .await?
            .and_then(|v| v.parse().ok())
            .unwrap_or_default())
    }

    /// Categories chosen for the dashboard budget widget
    pub async fn monitored_categories(&self) -> MoneybagsResult<Vec<CategoryId>> {
        Ok(self
            .get(MONITORED_CATEGORIES_KEY)
            .await?
            .map(|v| split_list(&v).iter().filter_map(|s| s.parse().ok()).collect())
            .unwrap_or_default())
    }
}

/// Database settings as shown and edited on the configuration page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Explicit URL, or none for the default file
    #[serde(default)]
    pub url: Option<String>,
    pub pool_size: u32,
    pub acquire_timeout_secs: u64,
}

impl From<&DatabaseSettings> for DatabaseConfig {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            url: settings.url.clone(),
            pool_size: settings.pool_size,
            acquire_timeout_secs: settings.acquire_timeout_secs,
        }
    }
}

impl DatabaseConfig {
    /// Check the values and turn them into settings
    pub fn into_settings(self) -> MoneybagsResult<DatabaseSettings> {
        if self.pool_size == 0 {
            return Err(MoneybagsError::Validation(
                "Pool size must be at least 1".into(),
            ));
        }
        if self.acquire_timeout_secs == 0 {
            return Err(MoneybagsError::Validation(
                "Acquire timeout must be at least 1 second".into(),
            ));
        }
        let url = self.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        if let Some(url) = &url {
            if !url.starts_with("sqlite:") {
                return Err(MoneybagsError::Validation(format!(
                    "Unsupported database URL '{}': expected sqlite:",
                    url
                )));
            }
        }
        Ok(DatabaseSettings {
            url,
            pool_size: self.pool_size,
            acquire_timeout_secs: self.acquire_timeout_secs,
        })
    }
}

/// Outcome of a connection test
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionTest {
    pub ok: bool,
    pub message: String,
}

/// Try to open and ping a database with the given settings
pub async fn test_connection(url: &str, settings: &DatabaseSettings) -> ConnectionTest {
    let result = async {
        let storage = Storage::connect(url, settings).await?;
        storage.ping().await?;
        storage.close().await;
        Ok::<_, MoneybagsError>(())
    }
    .await;

    match result {
        Ok(()) => ConnectionTest {
            ok: true,
            message: "Connection successful".into(),
        },
        Err(e) => {
            warn!(error = %e, "database connection test failed");
            ConnectionTest {
                ok: false,
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryType};

    #[tokio::test]
    async fn test_update_invalidates_cache() {
        let storage = Storage::in_memory().await.unwrap();
        let service = ConfigurationService::new(&storage);

        assert!(service.get_all().await.unwrap().is_empty());
        assert_eq!(service.currency_format().await.unwrap(), CurrencyFormat::Nok);

        let mut values = BTreeMap::new();
        values.insert(CURRENCY_FORMAT_KEY.to_string(), "USD".to_string());
        let all = service.update(values).await.unwrap();
        assert_eq!(all[CURRENCY_FORMAT_KEY], "usd");
        assert_eq!(service.currency_format().await.unwrap(), CurrencyFormat::Usd);
    }

    #[tokio::test]
    async fn test_cache_serves_stale_until_invalidated() {
        let storage = Storage::in_memory().await.unwrap();
        let service = ConfigurationService::new(&storage);
        assert!(service.get("theme").await.unwrap().is_none());

        // Written behind the service's back
        {
            let mut conn = storage.acquire().await.unwrap();
            configuration::set(&mut conn, "theme", "dark").await.unwrap();
        }
        assert!(service.get("theme").await.unwrap().is_none());

        storage.config_cache().invalidate();
        assert_eq!(service.get("theme").await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_read_racing_an_update_is_not_cached() {
        let storage = Storage::in_memory().await.unwrap();
        let service = ConfigurationService::new(&storage);

        // A reader captures its generation, then an update lands before it stores
        let cache = storage.config_cache();
        let generation = cache.generation();
        let stale = service.get_all().await.unwrap();
        let mut values = BTreeMap::new();
        values.insert(CURRENCY_FORMAT_KEY.to_string(), "eur".to_string());
        service.update(values).await.unwrap();
        cache.store(generation, stale).await;

        assert_eq!(service.currency_format().await.unwrap(), CurrencyFormat::Eur);
    }

    #[tokio::test]
    async fn test_known_keys_are_validated() {
        let storage = Storage::in_memory().await.unwrap();
        let service = ConfigurationService::new(&storage);

        let mut values = BTreeMap::new();
        values.insert(CURRENCY_FORMAT_KEY.to_string(), "gbp".to_string());
        assert!(service.update(values).await.unwrap_err().is_validation());

        let mut values = BTreeMap::new();
        values.insert(MONITORED_CATEGORIES_KEY.to_string(), CategoryId::new().to_string());
        assert!(service.update(values).await.unwrap_err().is_not_found());

        let food = Category::new("Food", CategoryType::Expenses);
        {
            let mut conn = storage.acquire().await.unwrap();
            categories::insert(&mut conn, &food).await.unwrap();
        }
        let mut values = BTreeMap::new();
        values.insert(MONITORED_CATEGORIES_KEY.to_string(), format!(" {}, ", food.id));
        service.update(values).await.unwrap();
        assert_eq!(service.monitored_categories().await.unwrap(), vec![food.id]);
    }

    #[test]
    fn test_database_config_validation() {
        let config = DatabaseConfig {
            url: Some("  ".into()),
            pool_size: 3,
            acquire_timeout_secs: 2,
        };
        let settings = config.into_settings().unwrap();
        assert!(settings.url.is_none());
        assert_eq!(settings.pool_size, 3);

        let config = DatabaseConfig {
            url: Some("postgres://localhost/db".into()),
            pool_size: 3,
            acquire_timeout_secs: 2,
        };
        assert!(config.into_settings().unwrap_err().is_validation());

        let config = DatabaseConfig {
            url: None,
            pool_size: 0,
            acquire_timeout_secs: 2,
        };
        assert!(config.into_settings().is_err());
    }

    #[tokio::test]
    async fn test_connection_to_memory_database() {
        let result = test_connection("sqlite::memory:", &DatabaseSettings::default()).await;
        assert!(result.ok, "{}", result.message);

        let dir = tempfile::TempDir::new().unwrap();
        let missing = format!("sqlite://{}/nope/x.db", dir.path().display());
        let result = test_connection(&missing, &DatabaseSettings::default()).await;
        assert!(!result.ok);
    }
}
