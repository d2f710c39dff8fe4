use async_trait::async_trait;
use chrono::Utc;
use rusqlite::OptionalExtension;
use tracing::debug;

use crate::database::DatabasePool;
use super::errors::RepositoryError;
use super::kv::KeyValueStore;

/// SQLite-backed key-value storage
#[derive(Debug, Clone)]
pub struct DatabaseStorage {
    pool: DatabasePool,
}

impl DatabaseStorage {
    /// Wrap an already migrated pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for DatabaseStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        debug!("Reading key from database: {}", key);
        let conn = self.pool.get()?;

        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        debug!("Storing key in database: {}", key);
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (key, value, Utc::now().to_rfc3339()),
        )?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), RepositoryError> {
        debug!("Removing key from database: {}", key);
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM kv_entries WHERE key = ?1", [key])?;
        Ok(())
    }
}
