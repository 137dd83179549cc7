//! SQLite-backed reading store

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::Row;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::models::Reading;

/// Upper bound for history queries
pub const MAX_RECENT_LIMIT: i64 = 1000;

/// Append-only store of level readings.
///
/// Cloning is cheap and shares the underlying pool. SQLite serialises
/// writers itself, so concurrent `append` calls only need the busy timeout.
#[derive(Clone)]
pub struct ReadingStore {
    pool: SqlitePool,
}

impl ReadingStore {
    /// Open (creating if missing) the database and ensure the schema exists
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = pool_options(config).connect_with(options).await?;

        let store = Self::from_pool(pool);
        store.ensure_schema().await?;

        info!(url = %config.url, "Database initialized successfully");
        Ok(store)
    }

    /// Wrap an existing pool. The schema is not touched.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `level_data` table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Store a new reading stamped with the current time
    pub async fn append(&self, level: f64) -> Result<Reading, StoreError> {
        if !level.is_finite() {
            return Err(StoreError::Invalid(format!(
                "level must be a finite number, got {level}"
            )));
        }

        let created_at = Utc::now();
        let result = sqlx::query("INSERT INTO level_data (level, created_at) VALUES (?, ?)")
            .bind(level)
            .bind(created_at)
            .execute(&self.pool)
            .await?;

        let reading = Reading {
            id: result.last_insert_rowid(),
            level,
            created_at,
        };

        debug!(reading_id = reading.id, level, "Stored reading");
        Ok(reading)
    }

    /// Level of the most recent reading
    pub async fn latest(&self) -> Result<f64, StoreError> {
        self.latest_reading().await.map(|reading| reading.level)
    }

    /// Most recent reading, newest `created_at` first and then highest id
    pub async fn latest_reading(&self) -> Result<Reading, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, level, created_at
            FROM level_data
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row_to_reading(&row)?),
            None => Err(StoreError::Empty),
        }
    }

    /// Newest-first history, `limit` clamped to `1..=MAX_RECENT_LIMIT`
    pub async fn recent(&self, limit: i64) -> Result<Vec<Reading>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, level, created_at
            FROM level_data
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit.clamp(1, MAX_RECENT_LIMIT))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row_to_reading(row).map_err(StoreError::from))
            .collect()
    }

    /// Number of stored readings
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM level_data")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Health check
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool, waiting for in-flight queries
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection pool closed");
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn pool_options(config: &DatabaseConfig) -> SqlitePoolOptions {
    if is_in_memory(&config.url) {
        // An in-memory database lives only as long as its last connection,
        // so pin exactly one and never let the reaper recycle it.
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections.max(1))
    }
}

fn row_to_reading(row: &SqliteRow) -> Result<Reading, sqlx::Error> {
    Ok(Reading {
        id: row.try_get("id")?,
        level: row.try_get("level")?,
        created_at: row.try_get("created_at")?,
    })
}
