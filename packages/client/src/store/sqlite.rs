//! SQLite-backed store.
//!
//! Uses `rusqlite` (bundled SQLite) behind an `Arc<Mutex<Connection>>`. Every
//! call runs inside `tokio::task::spawn_blocking`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use super::{LocalStore, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// SQLite implementation of [`LocalStore`].
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn map_err(e: rusqlite::Error) -> StoreError {
    StoreError::Internal(e.to_string())
}

fn join_err(e: tokio::task::JoinError) -> StoreError {
    StoreError::Internal(format!("task join error: {e}"))
}

#[async_trait]
impl LocalStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            conn.query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(map_err)
        })
        .await
        .map_err(join_err)?
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_string();
        let value = value.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(map_err)?;
            Ok(())
        })
        .await
        .map_err(join_err)?
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
                .map_err(map_err)?;
            Ok(())
        })
        .await
        .map_err(join_err)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_overwrites() {
        let s = SqliteStore::open_in_memory().unwrap();
        s.set("maintenance", "{\"a\":1}").await.unwrap();
        s.set("maintenance", "{\"a\":2}").await.unwrap();
        assert_eq!(
            s.get("maintenance").await.unwrap().as_deref(),
            Some("{\"a\":2}")
        );
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let s = SqliteStore::open_in_memory().unwrap();
        assert_eq!(s.get("nope").await.unwrap(), None);
        s.remove("nope").await.unwrap();
    }
}
