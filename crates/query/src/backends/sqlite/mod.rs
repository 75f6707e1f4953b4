//! SQLite backend.
//!
//! Stores every collection in one `documents(collection, id, data)` table
//! with the document body as JSON text. Queries compile to SQL with
//! `json_extract` field access and a two-key keyset predicate, so the pagers
//! run unchanged on top of it.
//!
//! Two orderings differ from the in-memory store: JSON booleans compare as
//! the integers 1 and 0, and arrays or objects compare as their JSON text.

mod query_builder;
mod schema;
mod store;

pub use query_builder::{SqlFragment, SqlParam, field_expr};
pub use schema::SCHEMA_VERSION;
pub use store::{SqliteQuery, SqliteStore, SqliteStoreConfig};
