//! Tests for budgeted keyword search.

use unionhall_query::config::QueryConfig;
use unionhall_query::core::{DocumentStore, SortSpec};
use unionhall_query::error::{BackendError, QueryError};
use unionhall_query::paging::{BoundedBatchSearch, KeysetPager, Paginator, SearchBudget, TextMatcher};
use unionhall_query::types::PageRequest;

use crate::common::*;

fn request(page: i64, limit: i64) -> PageRequest {
    PageRequest::new(page, limit, &QueryConfig::default())
}

fn search(batch_size: u32, max_docs: u32) -> BoundedBatchSearch {
    BoundedBatchSearch::new(KeysetPager::default(), SearchBudget::new(batch_size, max_docs))
}

// ============================================================================
// Read budget
// ============================================================================

#[tokio::test]
async fn test_never_reads_past_budget() {
    let store = memory_store(1000);

    let page = search(20, 50)
        .search(
            &store.collection(ACTIVITIES),
            &SortSpec::asc("order"),
            &request(1, 10),
            |_| false,
        )
        .await
        .unwrap();

    assert!(page.is_empty());
    assert_eq!(page.total(), Some(0));
    assert!(!page.has_more());
    assert!(page.page_info.is_approximate);
    assert_eq!(store.stats().queries(), 3);
    assert_eq!(store.stats().documents_read(), 50);
}

#[tokio::test]
async fn test_exhausted_collection_is_exact() {
    let store = memory_store(45);

    let page = search(20, 1000)
        .search(
            &store.collection(ACTIVITIES),
            &SortSpec::asc("order"),
            &request(1, 20),
            |doc| doc.data()["branchId"] == "branch-2",
        )
        .await
        .unwrap();

    assert_eq!(page.len(), 15);
    assert_eq!(page.total(), Some(15));
    assert!(!page.has_more());
    assert!(!page.page_info.is_approximate);
    assert_eq!(store.stats().queries(), 3);
}

// ============================================================================
// Sparse matches
// ============================================================================

// With an unbounded budget the scan runs to the end of the collection;
// `test_sparse_matches_with_tight_budget` stops after the third window.
#[tokio::test]
async fn test_sparse_matches_scan_whole_collection() {
    let store = memory_store_with_matches(100, &[5, 40, 41]);
    let matcher = TextMatcher::new("chess", ["name", "description"]);

    let page = search(20, 1000)
        .search(
            &store.collection(ACTIVITIES),
            &SortSpec::asc("order"),
            &request(1, 10),
            |doc| matcher.matches(doc),
        )
        .await
        .unwrap();

    assert_eq!(
        page_ids(&page),
        vec![activity_id(5), activity_id(40), activity_id(41)]
    );
    assert_eq!(page.total(), Some(3));
    assert!(!page.has_more());
    assert!(!page.page_info.is_approximate);
    // five full windows, then an empty one
    assert_eq!(store.stats().queries(), 6);
    assert_eq!(store.stats().documents_read(), 100);
}

#[tokio::test]
async fn test_sparse_matches_with_tight_budget() {
    let store = memory_store_with_matches(100, &[5, 40, 41]);
    let matcher = TextMatcher::new("CHESS", ["name"]);

    let page = search(20, 60)
        .search(
            &store.collection(ACTIVITIES),
            &SortSpec::asc("order"),
            &request(1, 10),
            |doc| matcher.matches(doc),
        )
        .await
        .unwrap();

    assert_eq!(page.len(), 3);
    assert_eq!(page.total(), Some(3));
    assert!(!page.has_more());
    assert!(page.page_info.is_approximate);
    assert_eq!(store.stats().queries(), 3);
    assert_eq!(store.stats().documents_read(), 60);
}

#[tokio::test]
async fn test_budget_equal_to_collection_is_approximate() {
    let store = memory_store_with_matches(60, &[5, 40, 41]);
    let matcher = TextMatcher::new("chess", ["name"]);

    let page = search(20, 60)
        .search(
            &store.collection(ACTIVITIES),
            &SortSpec::asc("order"),
            &request(1, 10),
            |doc| matcher.matches(doc),
        )
        .await
        .unwrap();

    // every window came back full, so the end of the collection was never seen
    assert_eq!(page.total(), Some(3));
    assert!(page.page_info.is_approximate);
    assert_eq!(store.stats().queries(), 3);
    assert_eq!(store.stats().documents_read(), 60);
}

#[tokio::test]
async fn test_stops_once_next_page_is_known() {
    let store = memory_store(500);

    let page = search(50, 1000)
        .search(
            &store.collection(ACTIVITIES),
            &SortSpec::asc("order"),
            &request(2, 10),
            |_| true,
        )
        .await
        .unwrap();

    assert_eq!(page.items[0].id(), activity_id(10));
    assert_eq!(page.len(), 10);
    assert!(page.has_more());
    assert!(page.page_info.is_approximate);
    assert_eq!(store.stats().queries(), 1);
}

// ============================================================================
// Failures and facade
// ============================================================================

#[tokio::test]
async fn test_window_failure_aborts_search() {
    let store = memory_store(50);
    store.fail_collection(ACTIVITIES, "quota exhausted");

    let err = search(20, 100)
        .search(
            &store.collection(ACTIVITIES),
            &SortSpec::asc("order"),
            &request(1, 10),
            |_| true,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        QueryError::Backend(BackendError::Unavailable { .. })
    ));
    assert_eq!(err.status_code(), 503);
}

#[tokio::test]
async fn test_paginator_search_page_maps_items() {
    let store = memory_store_with_matches(30, &[3, 17]);
    let config = QueryConfig {
        search_batch_size: 10,
        search_max_docs: 100,
        ..QueryConfig::default()
    };
    let paginator = Paginator::new(config);
    let matcher = TextMatcher::new("chess night", ["name"]);

    let request = paginator.request_from_query_string("limit=5");
    let page = paginator
        .search_page(
            &store.collection(ACTIVITIES),
            &SortSpec::desc("createdAt"),
            &request,
            |doc| matcher.matches(doc),
            |doc| doc.id().to_string(),
        )
        .await
        .unwrap();

    assert_eq!(page.items, vec![activity_id(17), activity_id(3)]);
    assert_eq!(page.total(), Some(2));
    assert!(!page.page_info.is_approximate);
}
