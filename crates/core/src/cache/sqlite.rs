//! SQLite-backed cache store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{CacheError, CacheKey, CacheStore};

/// Cache store persisted to a SQLite database, shared across process runs.
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Open the cache database, creating the file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path).map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self, CacheError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CacheError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS call_cache (
                key TEXT PRIMARY KEY,
                namespace TEXT NOT NULL,
                signature TEXT NOT NULL,
                value TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_call_cache_namespace ON call_cache(namespace);
            "#,
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }

    /// Number of stored entries.
    pub fn count(&self) -> Result<usize, CacheError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM call_cache", [], |row| row.get(0))
            .map_err(|e| CacheError::Database(e.to_string()))?;
        Ok(count as usize)
    }
}

impl CacheStore for SqliteCache {
    fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT value FROM call_cache WHERE key = ?",
            params![key.digest()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| CacheError::Database(e.to_string()))
    }

    fn put(&self, key: &CacheKey, value: &str) -> Result<bool, CacheError> {
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO call_cache (key, namespace, signature, value, created_at)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    key.digest(),
                    key.namespace,
                    key.signature,
                    value,
                    Utc::now().to_rfc3339()
                ],
            )
            .map_err(|e| CacheError::Database(e.to_string()))?;
        Ok(inserted > 0)
    }

    fn replace(&self, key: &CacheKey, value: &str) -> Result<(), CacheError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO call_cache (key, namespace, signature, value, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                key.digest(),
                key.namespace,
                key.signature,
                value,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(|e| CacheError::Database(e.to_string()))?;
        Ok(())
    }

    fn clear(&self, namespace: Option<&str>) -> Result<usize, CacheError> {
        let conn = self.lock()?;
        let removed = match namespace {
            Some(ns) => conn.execute("DELETE FROM call_cache WHERE namespace = ?", params![ns]),
            None => conn.execute("DELETE FROM call_cache", []),
        }
        .map_err(|e| CacheError::Database(e.to_string()))?;
        Ok(removed)
    }
}
