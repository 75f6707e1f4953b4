//! Document store abstraction.

use crate::core::query::Query;

/// A document store that hands out collection queries.
///
/// Resource handlers start every listing from [`DocumentStore::collection`],
/// add their role and resource filters, and pass the query to a pager.
pub trait DocumentStore: Send + Sync {
    /// The query type this store executes.
    type Query: Query;

    /// Returns the name of this backend (for logging and errors).
    fn backend_name(&self) -> &'static str;

    /// Returns an unfiltered, unordered query over a collection.
    fn collection(&self, name: &str) -> Self::Query;

    /// Returns the maximum number of values this store accepts in an IN filter.
    fn max_in_values(&self) -> usize;
}
