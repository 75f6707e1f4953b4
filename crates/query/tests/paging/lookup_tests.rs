//! Tests for chunked IN lookups.

use unionhall_query::backends::memory::MemoryStore;
use unionhall_query::config::QueryConfig;
use unionhall_query::core::{DocumentStore, Filter, Query};
use unionhall_query::error::{QueryError, ValidationError};
use unionhall_query::paging::{ChunkedLookup, Paginator, unique_ids};
use unionhall_query::types::DOCUMENT_ID;

use crate::common::*;

#[tokio::test]
async fn test_twenty_five_ids_in_three_queries() {
    let store = memory_store(40);
    let ids: Vec<String> = (0..25).map(activity_id).collect();

    let found = ChunkedLookup::new(10)
        .by_ids(&store.collection(ACTIVITIES), &ids)
        .await
        .unwrap();

    assert_eq!(found.len(), 25);
    assert!(ids.iter().all(|id| found.contains_key(id)));
    assert_eq!(store.stats().queries(), 3);
    assert_eq!(store.stats().documents_read(), 25);
}

#[tokio::test]
async fn test_custom_chunk_query() {
    let store = memory_store(30);
    let ids: Vec<String> = (0..30).step_by(2).map(activity_id).collect();
    let base = store
        .collection(ACTIVITIES)
        .filter(Filter::eq("isPublished", true));

    let found = ChunkedLookup::for_store(&store)
        .lookup(&ids, |chunk| {
            base.clone()
                .filter(Filter::is_in(DOCUMENT_ID, chunk.iter().cloned()))
        })
        .await
        .unwrap();

    // 0, 10 and 20 are unpublished
    assert_eq!(found.len(), 12);
    assert!(!found.contains_key(&activity_id(10)));
    assert_eq!(store.stats().queries(), 2);
}

#[tokio::test]
async fn test_chunk_failure_fails_whole_lookup() {
    let store = memory_store(30);
    store.fail_collection(ACTIVITIES, "backend down");
    let ids: Vec<String> = (0..25).map(activity_id).collect();

    let result = ChunkedLookup::new(10)
        .by_ids(&store.collection(ACTIVITIES), &ids)
        .await;

    let err = result.unwrap_err();
    assert!(err.is_backend());
    assert_eq!(err.status_code(), 503);
}

#[tokio::test]
async fn test_chunk_larger_than_store_limit_is_rejected() {
    let store = MemoryStore::with_max_in_values(10);
    let ids: Vec<String> = (0..11).map(activity_id).collect();

    let err = ChunkedLookup::new(11)
        .by_ids(&store.collection(ACTIVITIES), &ids)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        QueryError::Validation(ValidationError::InFilterTooLarge { len: 11, max: 10, .. })
    ));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_zero_chunk_size_is_rejected() {
    let store = memory_store(3);
    let err = ChunkedLookup::new(0)
        .by_ids(&store.collection(ACTIVITIES), &[activity_id(1)])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        QueryError::Validation(ValidationError::InvalidChunkSize { chunk_size: 0 })
    ));
    assert_eq!(store.stats().queries(), 0);
}

#[tokio::test]
async fn test_grouped_by_foreign_key() {
    let store = memory_store(30);
    let paginator = Paginator::new(QueryConfig {
        in_filter_max: 2,
        ..QueryConfig::default()
    });

    let groups = paginator
        .lookup_grouped(
            &store.collection(ACTIVITIES),
            "branchId",
            &["branch-0", "branch-2", "branch-9"],
        )
        .await
        .unwrap();

    assert_eq!(groups.len(), 3);
    assert_eq!(groups["branch-0"].len(), 10);
    assert_eq!(groups["branch-2"].len(), 10);
    assert!(groups["branch-9"].is_empty());
    assert_eq!(store.stats().queries(), 2);
}

#[tokio::test]
async fn test_duplicate_ids_resolved_once() {
    let store = memory_store(10);
    let requested = ["act-001", "act-002", "act-001", "act-003", "act-002"];
    let ids = unique_ids(requested);
    assert_eq!(ids, vec!["act-001", "act-002", "act-003"]);

    let paginator = Paginator::default();
    let found = paginator
        .lookup_by_ids(&store.collection(ACTIVITIES), &ids)
        .await
        .unwrap();
    assert_eq!(found.len(), 3);
    assert_eq!(store.stats().documents_read(), 3);
}
