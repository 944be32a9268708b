//! Durable key-value storage backends.

use std::future::Future;
use std::pin::Pin;

use dashmap::DashMap;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::chat::core::config::StorageConfig;
use crate::chat::core::errors::{ChatError, ChatResult};

/// Boxed future type for key-value store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// String key-value storage. Every `set` overwrites the whole value.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn get(&self, key: &str) -> StoreFuture<'_, ChatResult<Option<String>>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    /// Returns an error if storage access fails or the value exceeds the quota.
    fn set(&self, key: &str, value: String) -> StoreFuture<'_, ChatResult<()>>;
}

fn check_quota(key: &str, value: &str, max: usize) -> ChatResult<()> {
    if value.len() > max {
        return Err(ChatError::QuotaExceeded {
            key: key.to_string(),
            size: value.len(),
            max,
        });
    }
    Ok(())
}

/// `SQLite` implementation of the key-value store.
pub struct SqliteKvStore {
    conn: Connection,
    table: String,
    max_value_bytes: usize,
}

impl SqliteKvStore {
    /// Open (or create) the database file named in `config`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn new(config: &StorageConfig) -> ChatResult<Self> {
        let conn = Connection::open(&config.sqlite_path).await?;
        Self::with_connection(conn, config).await
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns an error if the database cannot be created.
    pub async fn open_in_memory(config: &StorageConfig) -> ChatResult<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::with_connection(conn, config).await
    }

    async fn with_connection(conn: Connection, config: &StorageConfig) -> ChatResult<Self> {
        let table = config.table.clone();
        let table_name = table.clone();

        conn.call(move |conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table_name} (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                )"
            ))?;
            Ok(())
        })
        .await?;

        Ok(Self {
            conn,
            table,
            max_value_bytes: config.max_value_bytes,
        })
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> StoreFuture<'_, ChatResult<Option<String>>> {
        let key = key.to_string();
        Box::pin(async move {
            let table = self.table.clone();
            let value = self
                .conn
                .call(move |conn| {
                    let value = conn
                        .query_row(
                            &format!("SELECT value FROM {table} WHERE key = ?1"),
                            rusqlite::params![key],
                            |row| row.get::<_, String>(0),
                        )
                        .optional()?;
                    Ok(value)
                })
                .await?;
            Ok(value)
        })
    }

    fn set(&self, key: &str, value: String) -> StoreFuture<'_, ChatResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            check_quota(&key, &value, self.max_value_bytes)?;

            let table = self.table.clone();
            let now_ms = chrono::Utc::now().timestamp_millis();
            self.conn
                .call(move |conn| {
                    conn.execute(
                        &format!(
                            "INSERT OR REPLACE INTO {table} (key, value, updated_at)
                             VALUES (?1, ?2, ?3)"
                        ),
                        rusqlite::params![key, value, now_ms],
                    )?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }
}

/// Process-local store. Contents are lost when the process exits.
pub struct InMemoryKvStore {
    entries: DashMap<String, String>,
    max_value_bytes: usize,
}

impl InMemoryKvStore {
    /// Create an empty store with a per-value size ceiling.
    #[must_use]
    pub fn new(max_value_bytes: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_value_bytes,
        }
    }

    /// Create an empty store using the quota from `config`.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.max_value_bytes)
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::from_config(&StorageConfig::default())
    }
}

impl KeyValueStore for InMemoryKvStore {
    fn get(&self, key: &str) -> StoreFuture<'_, ChatResult<Option<String>>> {
        let value = self.entries.get(key).map(|entry| entry.value().clone());
        Box::pin(std::future::ready(Ok(value)))
    }

    fn set(&self, key: &str, value: String) -> StoreFuture<'_, ChatResult<()>> {
        let result = check_quota(key, &value, self.max_value_bytes).map(|()| {
            self.entries.insert(key.to_string(), value);
        });
        Box::pin(std::future::ready(result))
    }
}
