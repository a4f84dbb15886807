//! Storage layer for Moneybags
//!
//! SQLite through a sqlx connection pool. Each table has a module of plain
//! functions taking `&mut SqliteConnection`, so the same code runs on a
//! pooled connection or inside a transaction.

pub mod budget;
pub mod categories;
pub mod configuration;
pub mod init;
pub mod payees;
pub mod supersaver;
pub mod templates;
pub mod transactions;

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqliteConnection};
use tracing::{debug, info};

pub use configuration::ConfigCache;
pub use init::seed_defaults;

use crate::config::settings::DatabaseSettings;
use crate::error::{MoneybagsError, MoneybagsResult};

/// Schema script applied at startup
pub const INITIAL_SCHEMA: &str = include_str!("../../migrations/001_initial_schema.sql");

/// Main storage handle shared by services and request handlers
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
    config_cache: Arc<ConfigCache>,
}

impl Storage {
    /// Connect to the database at `url` and make sure the schema exists
    pub async fn connect(url: &str, settings: &DatabaseSettings) -> MoneybagsResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.pool_size.max(1))
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        info!(url = %url, pool_size = settings.pool_size, "connected to database");

        let storage = Self::from_pool(pool);
        storage.create_schema().await?;
        Ok(storage)
    }

    /// A private in-memory database, used by tests
    pub async fn in_memory() -> MoneybagsResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // A single connection that never expires keeps the database alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let storage = Self::from_pool(pool);
        storage.create_schema().await?;
        Ok(storage)
    }

    fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            config_cache: Arc::new(ConfigCache::default()),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn config_cache(&self) -> &ConfigCache {
        &self.config_cache
    }

    /// Check out a pooled connection
    pub async fn acquire(&self) -> MoneybagsResult<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    /// Start a database transaction
    pub async fn begin(&self) -> MoneybagsResult<sqlx::Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Create all tables that don't exist yet
    pub async fn create_schema(&self) -> MoneybagsResult<()> {
        let mut conn = self.acquire().await?;
        apply_sql_script(&mut conn, INITIAL_SCHEMA).await?;
        debug!("schema ready");
        Ok(())
    }

    /// Apply a hand-written migration file in one transaction, returning
    /// the number of rows it changed
    pub async fn apply_migration_file(&self, path: &Path) -> MoneybagsResult<u64> {
        let script = std::fs::read_to_string(path).map_err(|e| {
            MoneybagsError::Io(format!("Failed to read migration {}: {}", path.display(), e))
        })?;

        let mut tx = self.begin().await?;
        let applied = apply_sql_script(&mut tx, &script).await?;
        tx.commit().await?;

        info!(file = %path.display(), rows_affected = applied, "migration applied");
        Ok(applied)
    }

    /// Check that a query round-trips
    pub async fn ping(&self) -> MoneybagsResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Run a multi-statement SQL script as-is
pub async fn apply_sql_script(conn: &mut SqliteConnection, script: &str) -> MoneybagsResult<u64> {
    let result = sqlx::Executor::execute(&mut *conn, sqlx::raw_sql(script)).await?;
    Ok(result.rows_affected())
}

/// Read a TEXT id column into a typed id
pub(crate) fn id_column<T: FromStr>(row: &SqliteRow, column: &str) -> MoneybagsResult<T> {
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .map_err(|_| MoneybagsError::Storage(format!("Invalid id '{}' in column {}", raw, column)))
}

/// Read a nullable TEXT id column
pub(crate) fn optional_id_column<T: FromStr>(
    row: &SqliteRow,
    column: &str,
) -> MoneybagsResult<Option<T>> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|raw| {
        raw.parse::<T>().map_err(|_| {
            MoneybagsError::Storage(format!("Invalid id '{}' in column {}", raw, column))
        })
    })
    .transpose()
}

/// Read a TEXT column holding a string-encoded enum
pub(crate) fn enum_column<T: FromStr>(row: &SqliteRow, column: &str) -> MoneybagsResult<T> {
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|_| {
        MoneybagsError::Storage(format!("Unexpected value '{}' in column {}", raw, column))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_initial_schema_has_all_tables() {
        let storage = Storage::in_memory().await.unwrap();
        let mut conn = storage.acquire().await.unwrap();
        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table'")
                .fetch_all(&mut *conn)
                .await
                .unwrap();
        for table in [
            "moneybags_categories",
            "moneybags_payees",
            "moneybags_budget_templates",
            "moneybags_budget_entries",
            "moneybags_transactions",
            "moneybags_configuration",
            "moneybags_supersaver_categories",
            "moneybags_supersaver_entries",
        ] {
            assert!(tables.iter().any(|t| t == table), "missing {}", table);
        }
    }

    #[tokio::test]
    async fn test_in_memory_storage_creates_schema() {
        let storage = Storage::in_memory().await.unwrap();
        storage.ping().await.unwrap();

        // Running the script a second time is harmless
        storage.create_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_database_and_migration() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let url = format!("sqlite://{}", db_path.display());

        let storage = Storage::connect(&url, &DatabaseSettings::default()).await.unwrap();
        assert!(db_path.exists());

        let migration = temp_dir.path().join("002_notes.sql");
        std::fs::write(
            &migration,
            "-- add notes\nCREATE TABLE IF NOT EXISTS moneybags_notes (id TEXT PRIMARY KEY);\n",
        )
        .unwrap();
        storage.apply_migration_file(&migration).await.unwrap();

        // Semicolons inside literals and trigger bodies stay part of their statement
        let migration = temp_dir.path().join("003_note_audit.sql");
        std::fs::write(
            &migration,
            "CREATE TABLE IF NOT EXISTS moneybags_note_log (body TEXT NOT NULL);\n\
             CREATE TABLE IF NOT EXISTS moneybags_note_text (id TEXT PRIMARY KEY, body TEXT NOT NULL);\n\
             CREATE TRIGGER IF NOT EXISTS moneybags_note_audit AFTER INSERT ON moneybags_note_text\n\
             BEGIN\n    INSERT INTO moneybags_note_log (body) VALUES (NEW.body);\nEND;\n\
             INSERT INTO moneybags_note_text (id, body) VALUES ('x', 'a;b');\n",
        )
        .unwrap();
        storage.apply_migration_file(&migration).await.unwrap();

        let mut conn = storage.acquire().await.unwrap();
        let logged: String = sqlx::query_scalar("SELECT body FROM moneybags_note_log")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(logged, "a;b");
        drop(conn);

        storage.close().await;
    }
}
