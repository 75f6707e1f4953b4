//! Store capability traits.
//!
//! The layer talks to a document store only through two seams:
//!
//! - [`Query`] - a composable, immutable query over one collection with
//!   `filter`, `order_by`, `limit`, `offset`, `start_after`, `get` and `count`
//! - [`DocumentStore`] - hands out collection queries and reports the store's
//!   IN-filter cardinality
//!
//! Any store that can express these operations can back the pagers: a managed
//! document database, or SQL with keyset emulation (see [`crate::backends`]).
//!
//! # Example: Implementing a Store
//!
//! ```ignore
//! use async_trait::async_trait;
//! use unionhall_query::core::{Filter, Query, SortDirection};
//! use unionhall_query::error::QueryResult;
//! use unionhall_query::types::{Document, FieldValue};
//!
//! #[derive(Debug, Clone)]
//! struct RemoteQuery {
//!     // ... request builder state
//! }
//!
//! #[async_trait]
//! impl Query for RemoteQuery {
//!     fn backend_name(&self) -> &'static str {
//!         "remote"
//!     }
//!
//!     async fn get(&self) -> QueryResult<Vec<Document>> {
//!         // Send the request...
//!         todo!()
//!     }
//!
//!     // ... implement the remaining builder methods and count()
//! }
//! ```

pub mod query;
pub mod store;

pub use query::{Filter, FilterOp, FilterValue, Query, SortDirection, SortSpec};
pub use store::DocumentStore;
