//! In-memory document store.
//!
//! [`MemoryStore`] keeps collections in process and evaluates queries with
//! the same semantics the managed store offers: single-field ordering with an
//! id tie-break, two-key `start_after`, offset, limit, count, and an IN filter
//! capped at a configurable cardinality. It also records how many queries
//! ran and how many documents they read (offset-skipped documents are billed
//! as reads, as the managed store does), which makes read-cost behavior
//! observable in tests.
//!
//! Documents without the ordered field are kept and sort as null.
//!
//! # Example
//!
//! ```
//! use unionhall_query::backends::memory::MemoryStore;
//! use unionhall_query::core::{DocumentStore, Filter, Query, SortDirection};
//! use serde_json::json;
//!
//! # tokio_test_block_on(async {
//! let store = MemoryStore::new();
//! store.insert("branches", "b1", json!({"city": "Izmir", "memberCount": 120}));
//! store.insert("branches", "b2", json!({"city": "Ankara", "memberCount": 80}));
//!
//! let docs = store
//!     .collection("branches")
//!     .filter(Filter::gt("memberCount", 100))
//!     .order_by("city", SortDirection::Ascending)
//!     .get()
//!     .await
//!     .unwrap();
//! assert_eq!(docs.len(), 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     futures::executor::block_on(f)
//! # }
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::trace;

use crate::core::{DocumentStore, Filter, FilterOp, Query, SortDirection};
use crate::error::{BackendError, QueryResult, ValidationError};
use crate::types::{DOCUMENT_ID, Document, FieldValue};

const BACKEND_NAME: &str = "memory";

/// Default IN-filter cardinality, matching the managed store.
pub const DEFAULT_MAX_IN_VALUES: usize = 10;

/// Read accounting for a [`MemoryStore`].
#[derive(Debug, Default)]
pub struct QueryStats {
    queries: AtomicU64,
    counts: AtomicU64,
    documents_read: AtomicU64,
}

impl QueryStats {
    /// Number of `get` executions.
    pub fn queries(&self) -> u64 {
        self.queries.load(AtomicOrdering::Relaxed)
    }

    /// Number of `count` executions.
    pub fn counts(&self) -> u64 {
        self.counts.load(AtomicOrdering::Relaxed)
    }

    /// Documents returned or skipped by `get` executions.
    pub fn documents_read(&self) -> u64 {
        self.documents_read.load(AtomicOrdering::Relaxed)
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.queries.store(0, AtomicOrdering::Relaxed);
        self.counts.store(0, AtomicOrdering::Relaxed);
        self.documents_read.store(0, AtomicOrdering::Relaxed);
    }
}

#[derive(Debug)]
struct MemoryInner {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    failures: RwLock<HashMap<String, String>>,
    stats: QueryStats,
    max_in_values: usize,
}

/// An in-process document store.
///
/// Cloning the store shares the underlying collections.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store with the default IN-filter cardinality.
    pub fn new() -> Self {
        Self::with_max_in_values(DEFAULT_MAX_IN_VALUES)
    }

    /// Creates an empty store that accepts up to `max_in_values` IN values.
    pub fn with_max_in_values(max_in_values: usize) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                collections: RwLock::new(HashMap::new()),
                failures: RwLock::new(HashMap::new()),
                stats: QueryStats::default(),
                max_in_values,
            }),
        }
    }

    /// Inserts or replaces a document.
    pub fn insert(&self, collection: &str, id: impl Into<String>, data: Value) {
        self.inner
            .collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.into(), data);
    }

    /// Inserts or replaces many documents.
    pub fn insert_many<I, S>(&self, collection: &str, documents: I)
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let mut collections = self.inner.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        for (id, data) in documents {
            docs.insert(id.into(), data);
        }
    }

    /// Removes a document, returning true if it existed.
    pub fn remove(&self, collection: &str, id: &str) -> bool {
        self.inner
            .collections
            .write()
            .get_mut(collection)
            .map(|docs| docs.remove(id).is_some())
            .unwrap_or(false)
    }

    /// Returns the number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.inner
            .collections
            .read()
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Returns true if the collection holds no documents.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Makes every query on `collection` fail as unavailable.
    pub fn fail_collection(&self, collection: &str, message: impl Into<String>) {
        self.inner
            .failures
            .write()
            .insert(collection.to_string(), message.into());
    }

    /// Clears all injected failures.
    pub fn clear_failures(&self) {
        self.inner.failures.write().clear();
    }

    /// Returns the read accounting for this store.
    pub fn stats(&self) -> &QueryStats {
        &self.inner.stats
    }
}

impl DocumentStore for MemoryStore {
    type Query = MemoryQuery;

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn collection(&self, name: &str) -> MemoryQuery {
        MemoryQuery {
            inner: Arc::clone(&self.inner),
            collection: name.to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
            offset: 0,
            start_after: None,
        }
    }

    fn max_in_values(&self) -> usize {
        self.inner.max_in_values
    }
}

/// A query over a [`MemoryStore`] collection.
#[derive(Debug, Clone)]
pub struct MemoryQuery {
    inner: Arc<MemoryInner>,
    collection: String,
    filters: Vec<Filter>,
    order: Option<(String, SortDirection)>,
    limit: Option<u32>,
    offset: u64,
    start_after: Option<(FieldValue, String)>,
}

impl MemoryQuery {
    fn preflight(&self) -> QueryResult<()> {
        if let Some(message) = self.inner.failures.read().get(&self.collection) {
            return Err(BackendError::Unavailable {
                backend_name: BACKEND_NAME.to_string(),
                message: message.clone(),
            }
            .into());
        }

        for filter in &self.filters {
            if filter.op == FilterOp::In && filter.values().len() > self.inner.max_in_values {
                return Err(ValidationError::InFilterTooLarge {
                    field: filter.field.clone(),
                    len: filter.values().len(),
                    max: self.inner.max_in_values,
                }
                .into());
            }
        }

        Ok(())
    }

    fn matching(&self) -> Vec<Document> {
        let collections = self.inner.collections.read();
        let Some(docs) = collections.get(&self.collection) else {
            return Vec::new();
        };

        docs.iter()
            .map(|(id, data)| Document::new(id.clone(), data.clone()))
            .filter(|doc| self.filters.iter().all(|filter| filter_matches(filter, doc)))
            .collect()
    }

    fn sort_key(&self) -> (&str, SortDirection) {
        match &self.order {
            Some((field, direction)) => (field.as_str(), *direction),
            None => (DOCUMENT_ID, SortDirection::Ascending),
        }
    }
}

fn compare_keys(
    field: &str,
    direction: SortDirection,
    a: (&FieldValue, &str),
    b: (&FieldValue, &str),
) -> Ordering {
    let ordering = if field == DOCUMENT_ID {
        a.1.cmp(b.1)
    } else {
        a.0.total_cmp(b.0).then_with(|| a.1.cmp(b.1))
    };
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

fn filter_matches(filter: &Filter, doc: &Document) -> bool {
    if filter.op == FilterOp::ArrayContains {
        let Some(Value::Array(items)) = doc.get(&filter.field) else {
            return false;
        };
        return filter.values().iter().any(|wanted| {
            items
                .iter()
                .any(|item| FieldValue::from_json(item).total_cmp(wanted) == Ordering::Equal)
        });
    }

    let actual = doc.field(&filter.field);
    let equals = |wanted: &FieldValue| actual.total_cmp(wanted) == Ordering::Equal;

    match filter.op {
        FilterOp::Equal => filter.values().iter().any(equals),
        FilterOp::In => filter.values().iter().any(equals),
        FilterOp::NotEqual => !actual.is_null() && !filter.values().iter().any(equals),
        FilterOp::LessThan
        | FilterOp::LessOrEqual
        | FilterOp::GreaterThan
        | FilterOp::GreaterOrEqual => {
            if actual.is_null() {
                return false;
            }
            filter.values().iter().all(|bound| {
                let ordering = actual.total_cmp(bound);
                match filter.op {
                    FilterOp::LessThan => ordering == Ordering::Less,
                    FilterOp::LessOrEqual => ordering != Ordering::Greater,
                    FilterOp::GreaterThan => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                }
            })
        }
        FilterOp::ArrayContains => false,
    }
}

#[async_trait]
impl Query for MemoryQuery {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order = Some((field.to_string(), direction));
        self
    }

    fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    fn start_after(mut self, sort_value: FieldValue, document_id: &str) -> Self {
        self.start_after = Some((sort_value, document_id.to_string()));
        self
    }

    async fn get(&self) -> QueryResult<Vec<Document>> {
        self.preflight()?;

        let (field, direction) = self.sort_key();
        let mut docs = self.matching();
        docs.sort_by(|a, b| {
            compare_keys(
                field,
                direction,
                (&a.field(field), a.id()),
                (&b.field(field), b.id()),
            )
        });

        if let Some((value, id)) = &self.start_after {
            docs.retain(|doc| {
                compare_keys(field, direction, (&doc.field(field), doc.id()), (value, id))
                    == Ordering::Greater
            });
        }

        let skipped = (self.offset as usize).min(docs.len());
        let limit = self.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let results: Vec<Document> = docs.into_iter().skip(skipped).take(limit).collect();

        let stats = &self.inner.stats;
        stats.queries.fetch_add(1, AtomicOrdering::Relaxed);
        stats
            .documents_read
            .fetch_add((skipped + results.len()) as u64, AtomicOrdering::Relaxed);

        trace!(
            collection = %self.collection,
            skipped = skipped,
            returned = results.len(),
            "Memory query executed"
        );

        Ok(results)
    }

    async fn count(&self) -> QueryResult<u64> {
        self.preflight()?;
        self.inner.stats.counts.fetch_add(1, AtomicOrdering::Relaxed);
        Ok(self.matching().len() as u64)
    }
}
