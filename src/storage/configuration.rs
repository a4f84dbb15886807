//! Configuration key/value repository and its in-process cache

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use sqlx::{Row, SqliteConnection};

use crate::error::MoneybagsResult;
use crate::models::ConfigEntry;

use super::id_column;

/// How long a cached configuration snapshot stays valid
pub const CONFIG_CACHE_TTL: Duration = Duration::from_secs(300);

pub async fn list(conn: &mut SqliteConnection) -> MoneybagsResult<Vec<ConfigEntry>> {
    let rows = sqlx::query(
        "SELECT id, key, value, created_at, updated_at FROM moneybags_configuration ORDER BY key",
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| {
            let created_at: DateTime<Utc> = row.try_get("created_at")?;
            let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
            Ok(ConfigEntry {
                id: id_column(row, "id")?,
                key: row.try_get("key")?,
                value: row.try_get("value")?,
                created_at,
                updated_at,
            })
        })
        .collect()
}

pub async fn get(conn: &mut SqliteConnection, key: &str) -> MoneybagsResult<Option<String>> {
    let value: Option<String> =
        sqlx::query_scalar("SELECT value FROM moneybags_configuration WHERE key = ?")
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(value)
}

/// Insert or overwrite a key
pub async fn set(conn: &mut SqliteConnection, key: &str, value: &str) -> MoneybagsResult<()> {
    let entry = ConfigEntry::new(key, value);
    sqlx::query(
        "INSERT INTO moneybags_configuration (id, key, value, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(entry.id.to_db())
    .bind(&entry.key)
    .bind(&entry.value)
    .bind(entry.created_at)
    .bind(entry.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Snapshot of the configuration table with an expiry
///
/// Snapshots are keyed by a generation that [`ConfigCache::invalidate`]
/// bumps, so a snapshot read before an update can never be served after it.
#[derive(Debug)]
pub struct ConfigCache {
    inner: Cache<u64, BTreeMap<String, String>>,
    generation: AtomicU64,
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::with_ttl(CONFIG_CACHE_TTL)
    }
}

impl ConfigCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(4).time_to_live(ttl).build(),
            generation: AtomicU64::new(0),
        }
    }

    /// Current generation; pass it to [`ConfigCache::store`] for values
    /// read after this call
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// The cached values, if present and not expired
    pub async fn get(&self) -> Option<BTreeMap<String, String>> {
        self.inner.get(&self.generation()).await
    }

    /// Cache values read during `generation`
    pub async fn store(&self, generation: u64, values: BTreeMap<String, String>) {
        self.inner.insert(generation, values).await;
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    #[tokio::test]
    async fn test_set_overwrites() {
        let storage = Storage::in_memory().await.unwrap();
        let mut conn = storage.acquire().await.unwrap();

        set(&mut conn, "currency_format", "nok").await.unwrap();
        set(&mut conn, "currency_format", "usd").await.unwrap();

        assert_eq!(get(&mut conn, "currency_format").await.unwrap().as_deref(), Some("usd"));
        assert_eq!(list(&mut conn).await.unwrap().len(), 1);
        assert!(get(&mut conn, "missing").await.unwrap().is_none());
    }

    fn values(currency: &str) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        values.insert("currency_format".to_string(), currency.to_string());
        values
    }

    #[tokio::test]
    async fn test_cache_invalidation() {
        let cache = ConfigCache::default();
        assert!(cache.get().await.is_none());

        cache.store(cache.generation(), values("eur")).await;
        assert_eq!(cache.get().await.unwrap()["currency_format"], "eur");

        cache.invalidate();
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_from_before_invalidation_is_not_served() {
        let cache = ConfigCache::default();

        let generation = cache.generation();
        cache.invalidate();
        cache.store(generation, values("nok")).await;
        assert!(cache.get().await.is_none());

        cache.store(cache.generation(), values("usd")).await;
        assert_eq!(cache.get().await.unwrap()["currency_format"], "usd");
    }

    #[tokio::test]
    async fn test_cache_expires() {
        let cache = ConfigCache::with_ttl(Duration::from_millis(50));
        cache.store(cache.generation(), values("eur")).await;
        assert!(cache.get().await.is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.get().await.is_none());
    }
}
