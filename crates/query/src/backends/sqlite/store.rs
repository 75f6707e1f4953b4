//! SQLite document store.

use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, params_from_iter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::core::{DocumentStore, Filter, Query, SortDirection};
use crate::error::{BackendError, QueryResult};
use crate::types::{Document, FieldValue};

use super::query_builder::{QuerySpec, build_count, build_select};
use super::schema;

const BACKEND_NAME: &str = "sqlite";

/// Configuration for the SQLite store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Enable WAL mode for file databases.
    #[serde(default = "default_true")]
    pub enable_wal: bool,

    /// Maximum number of values accepted in one IN filter.
    #[serde(default = "default_max_in_values")]
    pub max_in_values: usize,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_max_in_values() -> usize {
    10
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
            max_in_values: default_max_in_values(),
        }
    }
}

/// Document store backed by a single SQLite table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteStoreConfig,
    is_memory: bool,
}

impl Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("config", &self.config)
            .field("is_memory", &self.is_memory)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Creates an in-memory store with its schema initialized.
    pub fn in_memory() -> QueryResult<Self> {
        let store = Self::with_config(":memory:", SqliteStoreConfig::default())?;
        store.init_schema()?;
        Ok(store)
    }

    /// Opens or creates a file database.
    pub fn open<P: AsRef<Path>>(path: P) -> QueryResult<Self> {
        Self::with_config(path, SqliteStoreConfig::default())
    }

    /// Opens a database with custom configuration.
    ///
    /// An in-memory database is private to its connection, so `:memory:`
    /// always gets a single-connection pool.
    pub fn with_config<P: AsRef<Path>>(path: P, config: SqliteStoreConfig) -> QueryResult<Self> {
        let is_memory = path.as_ref().to_string_lossy() == ":memory:";

        let busy_timeout = Duration::from_millis(u64::from(config.busy_timeout_ms));
        let manager = if is_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.as_ref())
        }
        .with_init(move |conn| conn.busy_timeout(busy_timeout));

        let max_size = if is_memory { 1 } else { config.max_connections.max(1) };
        let pool = Pool::builder()
            .max_size(max_size)
            .min_idle(Some(config.min_connections.min(max_size)))
            .connection_timeout(Duration::from_millis(config.connection_timeout_ms))
            .build(manager)
            .map_err(|e| BackendError::ConnectionFailed {
                backend_name: BACKEND_NAME.to_string(),
                message: e.to_string(),
            })?;

        let store = Self {
            pool,
            config,
            is_memory,
        };
        store.configure_connection()?;
        Ok(store)
    }

    /// Initializes the database schema.
    pub fn init_schema(&self) -> QueryResult<()> {
        let conn = self.connection()?;
        schema::initialize_schema(&conn)
    }

    /// Inserts or replaces a document.
    pub fn insert(&self, collection: &str, id: &str, data: &Value) -> QueryResult<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO documents (collection, id, data) VALUES (?1, ?2, ?3)
             ON CONFLICT(collection, id) DO UPDATE SET data = excluded.data",
            params![collection, id, serde_json::to_string(data)?],
        )?;
        Ok(())
    }

    /// Inserts or replaces many documents in one transaction.
    pub fn insert_many<'a, I>(&self, collection: &str, documents: I) -> QueryResult<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO documents (collection, id, data) VALUES (?1, ?2, ?3)
                 ON CONFLICT(collection, id) DO UPDATE SET data = excluded.data",
            )?;
            for (id, data) in documents {
                stmt.execute(params![collection, id, serde_json::to_string(data)?])?;
                written += 1;
            }
        }
        tx.commit()?;
        debug!(collection = collection, written = written, "Inserted documents");
        Ok(written)
    }

    /// Removes a document, returning true if it existed.
    pub fn remove(&self, collection: &str, id: &str) -> QueryResult<bool> {
        let conn = self.connection()?;
        let removed = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(removed > 0)
    }

    /// Returns whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    fn connection(&self) -> QueryResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    fn configure_connection(&self) -> QueryResult<()> {
        if self.config.enable_wal && !self.is_memory {
            let conn = self.connection()?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
                .map_err(|e| BackendError::Internal {
                    backend_name: BACKEND_NAME.to_string(),
                    message: format!("Failed to enable WAL mode: {}", e),
                    source: None,
                })?;
        }
        Ok(())
    }
}

impl DocumentStore for SqliteStore {
    type Query = SqliteQuery;

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn collection(&self, name: &str) -> SqliteQuery {
        SqliteQuery {
            pool: self.pool.clone(),
            max_in_values: self.config.max_in_values,
            spec: QuerySpec {
                collection: name.to_string(),
                ..Default::default()
            },
        }
    }

    fn max_in_values(&self) -> usize {
        self.config.max_in_values
    }
}

/// A query over a [`SqliteStore`] collection.
#[derive(Clone)]
pub struct SqliteQuery {
    pool: Pool<SqliteConnectionManager>,
    max_in_values: usize,
    spec: QuerySpec,
}

impl Debug for SqliteQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteQuery")
            .field("spec", &self.spec)
            .field("max_in_values", &self.max_in_values)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Query for SqliteQuery {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn filter(mut self, filter: Filter) -> Self {
        self.spec.filters.push(filter);
        self
    }

    fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.spec.order = Some((field.to_string(), direction));
        self
    }

    fn limit(mut self, limit: u32) -> Self {
        self.spec.limit = Some(limit);
        self
    }

    fn offset(mut self, offset: u64) -> Self {
        self.spec.offset = offset;
        self
    }

    fn start_after(mut self, sort_value: FieldValue, document_id: &str) -> Self {
        self.spec.start_after = Some((sort_value, document_id.to_string()));
        self
    }

    async fn get(&self) -> QueryResult<Vec<Document>> {
        let frag = build_select(&self.spec, self.max_in_values)?;
        trace!(sql = %frag.sql, "Executing SQLite query");

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&frag.sql)?;
        let rows = stmt.query_map(params_from_iter(frag.params.iter()), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut docs = Vec::new();
        for row in rows {
            let (id, data) = row?;
            docs.push(Document::new(id, serde_json::from_str(&data)?));
        }
        Ok(docs)
    }

    async fn count(&self) -> QueryResult<u64> {
        let frag = build_count(&self.spec, self.max_in_values)?;
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(&frag.sql, params_from_iter(frag.params.iter()), |row| {
            row.get(0)
        })?;
        Ok(count.max(0) as u64)
    }
}
