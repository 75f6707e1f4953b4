//! Chunked IN lookups.
//!
//! The store caps IN filters at a small number of values, so a lookup over
//! an arbitrary id list is split into chunks of at most that many ids. All
//! chunk queries run concurrently and their results are merged. If any
//! chunk fails the whole lookup fails with that error; callers never see a
//! partial result.

use std::collections::{HashMap, HashSet};

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::config::QueryConfig;
use crate::core::{DocumentStore, Filter, Query};
use crate::error::{QueryResult, ValidationError};
use crate::types::{DOCUMENT_ID, Document};

/// Splits `ids` into order-preserving chunks of at most `chunk_size`.
pub fn chunk_ids<S: AsRef<str>>(ids: &[S], chunk_size: usize) -> QueryResult<Vec<Vec<String>>> {
    if chunk_size == 0 {
        return Err(ValidationError::InvalidChunkSize { chunk_size }.into());
    }
    Ok(ids
        .chunks(chunk_size)
        .map(|chunk| chunk.iter().map(|id| id.as_ref().to_string()).collect())
        .collect())
}

/// Removes duplicate ids, keeping the first occurrence of each.
pub fn unique_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter_map(|id| {
            let id = id.as_ref();
            seen.insert(id.to_string()).then(|| id.to_string())
        })
        .collect()
}

/// Batched IN-filter lookups with concurrent fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkedLookup {
    chunk_size: usize,
}

impl ChunkedLookup {
    /// Creates a lookup that puts at most `chunk_size` values in one IN filter.
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Uses the configured IN-filter cardinality.
    pub fn from_config(config: &QueryConfig) -> Self {
        Self::new(config.in_filter_max)
    }

    /// Uses the cardinality the store reports.
    pub fn for_store<S: DocumentStore>(store: &S) -> Self {
        Self::new(store.max_in_values())
    }

    /// Returns the chunk size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Runs one query per chunk of `ids` and merges the results by document id.
    ///
    /// `build` turns a chunk into a query, typically an IN filter over it.
    /// A document returned by more than one chunk keeps the last copy seen.
    pub async fn lookup<Q, S, F>(&self, ids: &[S], build: F) -> QueryResult<HashMap<String, Document>>
    where
        Q: Query,
        S: AsRef<str>,
        F: Fn(&[String]) -> Q,
    {
        let chunks = chunk_ids(ids, self.chunk_size)?;
        if chunks.is_empty() {
            return Ok(HashMap::new());
        }

        let queries: Vec<Q> = chunks.iter().map(|chunk| build(chunk)).collect();
        debug!(ids = ids.len(), chunks = queries.len(), "Running chunked lookup");

        let results = try_join_all(queries.iter().map(|query| query.get()))
            .await
            .inspect_err(|e| warn!(error = %e, "Chunked lookup failed"))?;

        let mut found = HashMap::new();
        for doc in results.into_iter().flatten() {
            found.insert(doc.id().to_string(), doc);
        }
        Ok(found)
    }

    /// Fetches documents by id.
    ///
    /// Ids that do not exist are simply absent from the result.
    pub async fn by_ids<Q, S>(&self, base: &Q, ids: &[S]) -> QueryResult<HashMap<String, Document>>
    where
        Q: Query,
        S: AsRef<str>,
    {
        self.lookup(ids, |chunk| {
            base.clone()
                .filter(Filter::is_in(DOCUMENT_ID, chunk.iter().cloned()))
        })
        .await
    }

    /// Fetches the documents whose `field` is one of `keys`, grouped by key.
    ///
    /// Every requested key is present in the result, with an empty vector
    /// when nothing matched. Duplicate keys are queried once.
    pub async fn grouped<Q, S>(
        &self,
        base: &Q,
        field: &str,
        keys: &[S],
    ) -> QueryResult<HashMap<String, Vec<Document>>>
    where
        Q: Query,
        S: AsRef<str>,
    {
        let keys = unique_ids(keys);
        let chunks = chunk_ids(&keys, self.chunk_size)?;

        let mut groups: HashMap<String, Vec<Document>> =
            keys.iter().map(|key| (key.clone(), Vec::new())).collect();
        if chunks.is_empty() {
            return Ok(groups);
        }

        let queries: Vec<Q> = chunks
            .iter()
            .map(|chunk| base.clone().filter(Filter::is_in(field, chunk.iter().cloned())))
            .collect();
        debug!(field = field, keys = keys.len(), chunks = queries.len(), "Running grouped lookup");

        let results = try_join_all(queries.iter().map(|query| query.get()))
            .await
            .inspect_err(|e| warn!(error = %e, field = field, "Grouped lookup failed"))?;

        for doc in results.into_iter().flatten() {
            if let Some(key) = doc.field(field).as_key() {
                groups.entry(key).or_default().push(doc);
            }
        }
        Ok(groups)
    }
}
