//! Pagination, lookup and search over document store queries.
//!
//! | Component | Use it for |
//! |-----------|------------|
//! | [`KeysetPager`] | infinite scroll; cheapest, no total |
//! | [`HybridPager`] | page-number UIs that need a total, with a cursor escape hatch |
//! | [`BoundedBatchSearch`] | `?search=` over collections without a text index |
//! | [`ChunkedLookup`] | resolving foreign keys in batches of the IN-filter limit |
//!
//! [`Paginator`] wires all of them from one [`QueryConfig`] and is what
//! resource handlers call.

pub mod hybrid;
pub mod keyset;
pub mod lookup;
pub mod search;

use std::collections::HashMap;

use url::Url;

use crate::config::QueryConfig;
use crate::core::{Query, SortSpec};
use crate::error::QueryResult;
use crate::types::{Document, Page, PageRequest};

pub use hybrid::HybridPager;
pub use keyset::KeysetPager;
pub use lookup::{ChunkedLookup, chunk_ids, unique_ids};
pub use search::{BoundedBatchSearch, SearchBudget, TextMatcher};

/// Handler-facing entry point for listings, searches and lookups.
///
/// # Example
///
/// ```
/// use unionhall_query::backends::memory::MemoryStore;
/// use unionhall_query::config::QueryConfig;
/// use unionhall_query::core::{DocumentStore, Filter, Query, SortSpec};
/// use unionhall_query::paging::Paginator;
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let store = MemoryStore::new();
/// for i in 0..30 {
///     store.insert("news", format!("n{i:02}"), json!({"createdAt": i, "isPublished": true}));
/// }
///
/// let paginator = Paginator::new(QueryConfig::default());
/// let request = paginator.request_from_query_string("page=2&limit=10");
/// let query = store.collection("news").filter(Filter::eq("isPublished", true));
///
/// let page = paginator
///     .list_page(&query, &SortSpec::desc("createdAt"), &request, |doc| doc.id().to_string())
///     .await
///     .unwrap();
/// assert_eq!(page.items.first().map(String::as_str), Some("n19"));
/// assert_eq!(page.total(), Some(30));
/// # });
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Paginator {
    config: QueryConfig,
    hybrid: HybridPager,
    search: BoundedBatchSearch,
    lookup: ChunkedLookup,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}

impl Paginator {
    /// Creates a paginator from configuration.
    pub fn new(config: QueryConfig) -> Self {
        Self {
            hybrid: HybridPager::from_config(&config),
            search: BoundedBatchSearch::from_config(&config),
            lookup: ChunkedLookup::from_config(&config),
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Returns the hybrid pager used by [`Paginator::list_page`].
    pub fn hybrid(&self) -> &HybridPager {
        &self.hybrid
    }

    /// Returns the keyset pager.
    pub fn keyset(&self) -> &KeysetPager {
        self.hybrid.keyset()
    }

    /// Returns the bounded search used by [`Paginator::search_page`].
    pub fn search(&self) -> &BoundedBatchSearch {
        &self.search
    }

    /// Returns the chunked lookup.
    pub fn chunked_lookup(&self) -> &ChunkedLookup {
        &self.lookup
    }

    /// Parses a page request from an urlencoded query string.
    pub fn request_from_query_string(&self, query: &str) -> PageRequest {
        PageRequest::from_query_string(query, &self.config)
    }

    /// Parses a page request from a request URL.
    pub fn request_from_url(&self, url: &Url) -> PageRequest {
        PageRequest::from_url(url, &self.config)
    }

    /// Lists one page of `query` in `sort` order and maps every document.
    pub async fn list_page<Q, T, M>(
        &self,
        query: &Q,
        sort: &SortSpec,
        request: &PageRequest,
        mapper: M,
    ) -> QueryResult<Page<T>>
    where
        Q: Query,
        M: FnMut(Document) -> T,
    {
        Ok(self.hybrid.page(query, sort, request).await?.map(mapper))
    }

    /// Searches `query` with `predicate` and maps every matching document.
    pub async fn search_page<Q, T, P, M>(
        &self,
        query: &Q,
        sort: &SortSpec,
        request: &PageRequest,
        predicate: P,
        mapper: M,
    ) -> QueryResult<Page<T>>
    where
        Q: Query,
        P: Fn(&Document) -> bool,
        M: FnMut(Document) -> T,
    {
        Ok(self
            .search
            .search(query, sort, request, predicate)
            .await?
            .map(mapper))
    }

    /// Runs a chunked lookup with a caller-built query per chunk.
    pub async fn lookup<Q, S, F>(&self, ids: &[S], build: F) -> QueryResult<HashMap<String, Document>>
    where
        Q: Query,
        S: AsRef<str>,
        F: Fn(&[String]) -> Q,
    {
        self.lookup.lookup(ids, build).await
    }

    /// Fetches documents by id in chunks.
    pub async fn lookup_by_ids<Q, S>(&self, base: &Q, ids: &[S]) -> QueryResult<HashMap<String, Document>>
    where
        Q: Query,
        S: AsRef<str>,
    {
        self.lookup.by_ids(base, ids).await
    }

    /// Fetches documents whose `field` is one of `keys`, grouped by key.
    pub async fn lookup_grouped<Q, S>(
        &self,
        base: &Q,
        field: &str,
        keys: &[S],
    ) -> QueryResult<HashMap<String, Vec<Document>>>
    where
        Q: Query,
        S: AsRef<str>,
    {
        self.lookup.grouped(base, field, keys).await
    }
}
