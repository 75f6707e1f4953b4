//! SQLite schema for the document table.

use rusqlite::Connection;

use crate::error::{BackendError, QueryResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Creates the schema if needed and records its version.
pub fn initialize_schema(conn: &Connection) -> QueryResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_schema_v1(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(BackendError::Internal {
            backend_name: "sqlite".to_string(),
            message: format!(
                "database schema version {} is newer than supported version {}",
                current_version, SCHEMA_VERSION
            ),
            source: None,
        }
        .into());
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> QueryResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| internal("Failed to create schema_version table", e))?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> QueryResult<()> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| internal("Failed to clear schema_version", e))?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
        .map_err(|e| internal("Failed to set schema_version", e))?;
    Ok(())
}

fn create_schema_v1(conn: &Connection) -> QueryResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            data TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        );",
    )
    .map_err(|e| internal("Failed to create documents table", e))
}

fn internal(context: &str, e: rusqlite::Error) -> crate::error::QueryError {
    BackendError::Internal {
        backend_name: "sqlite".to_string(),
        message: format!("{}: {}", context, e),
        source: None,
    }
    .into()
}
