//! Unionhall Query Access Layer
//!
//! Paginated, searchable listings over a document store that charges per
//! document read, cannot skip documents cheaply, has no full-text index, and
//! caps IN filters at a small number of values.
//!
//! # Features
//!
//! - **Keyset pagination**: opaque cursors with a two-key `(sort value, id)`
//!   position and a `limit + 1` probe instead of counting
//! - **Hybrid pagination**: page numbers with a concurrent total for UIs that
//!   need one, with cursors as the cheap path
//! - **Bounded search**: keyword search in keyset windows with a hard read
//!   budget and an approximate-total flag
//! - **Chunked lookups**: IN-filter batching with concurrent fan-out
//!
//! # Backend Features
//!
//! - `sqlite` (default) - SQLite store with keyset emulation in SQL
//!
//! The in-memory store is always available.
//!
//! # Architecture
//!
//! - [`types`] - field values, documents, cursors, pages and page requests
//! - [`core`] - the [`Query`](core::Query) and [`DocumentStore`](core::DocumentStore) traits
//! - [`paging`] - pagers, search, lookups and the [`Paginator`] facade
//! - [`backends`] - store implementations
//! - [`config`] - limits, budgets and count policy
//! - [`error`] - error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use unionhall_query::backends::memory::MemoryStore;
//! use unionhall_query::core::{DocumentStore, SortSpec};
//! use unionhall_query::paging::KeysetPager;
//! use serde_json::json;
//!
//! # futures::executor::block_on(async {
//! let store = MemoryStore::new();
//! for i in 0..5 {
//!     store.insert("members", format!("m{i}"), json!({"joinedAt": i}));
//! }
//!
//! let pager = KeysetPager::default();
//! let query = store.collection("members");
//! let sort = SortSpec::asc("joinedAt");
//!
//! let first = pager.page(&query, &sort, 3, None).await.unwrap();
//! assert_eq!(first.len(), 3);
//! assert!(first.has_more());
//!
//! let second = pager.page(&query, &sort, 3, first.next_cursor()).await.unwrap();
//! assert_eq!(second.len(), 2);
//! assert!(!second.has_more());
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod config;
pub mod core;
pub mod error;
pub mod paging;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{CountMode, QueryConfig};
pub use error::{BackendError, QueryError, QueryResult, ValidationError};
pub use paging::Paginator;
pub use types::{Document, FieldValue, Page, PageCursor, PageInfo, PageRequest};

// Re-export core traits
pub use crate::core::{DocumentStore, Filter, Query, SortDirection, SortSpec};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
