//! Tests for hybrid (page-number and cursor) pagination.

use unionhall_query::config::{CountMode, QueryConfig};
use unionhall_query::core::{DocumentStore, Filter, Query, SortSpec};
use unionhall_query::paging::{HybridPager, KeysetPager, Paginator};
use unionhall_query::types::PageRequest;

use crate::common::*;

fn request(page: i64, limit: i64) -> PageRequest {
    PageRequest::new(page, limit, &QueryConfig::default())
}

#[tokio::test]
async fn test_first_page_matches_keyset() {
    let store = memory_store(40);
    let query = store.collection(ACTIVITIES);
    let sort = SortSpec::desc("createdAt");

    let hybrid = HybridPager::default()
        .page(&query, &sort, &request(1, 15))
        .await
        .unwrap();
    let keyset = KeysetPager::default()
        .page(&query, &sort, 15, None)
        .await
        .unwrap();

    assert_eq!(page_ids(&hybrid), page_ids(&keyset));
    assert_eq!(hybrid.has_more(), keyset.has_more());
    assert_eq!(hybrid.next_cursor(), keyset.next_cursor());
    assert_eq!(hybrid.total(), Some(40));
    assert_eq!(keyset.total(), None);
}

#[tokio::test]
async fn test_scenario_twenty_three_by_page_number() {
    let store = memory_store(23);
    let query = store.collection(ACTIVITIES);
    let sort = SortSpec::asc("order");
    let pager = HybridPager::default();

    let page = pager.page(&query, &sort, &request(3, 10)).await.unwrap();
    assert_eq!(page.len(), 3);
    assert!(!page.has_more());
    assert_eq!(page.total(), Some(23));
    assert_eq!(page.page_info.page, Some(3));
    assert_eq!(page.page_info.total_pages(), Some(3));
    assert_eq!(page.items[0].id(), activity_id(20));
}

#[tokio::test]
async fn test_page_numbers_are_clamped() {
    let store = memory_store(8);
    let query = store.collection(ACTIVITIES);
    let sort = SortSpec::asc("order");
    let pager = HybridPager::default();

    let first = page_ids(&pager.page(&query, &sort, &request(1, 3)).await.unwrap());
    for page_number in [0, -5] {
        let page = pager
            .page(&query, &sort, &request(page_number, 3))
            .await
            .unwrap();
        assert_eq!(page.page_info.page, Some(1));
        assert_eq!(page_ids(&page), first);
    }
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let store = memory_store(23);
    let query = store.collection(ACTIVITIES);

    let page = HybridPager::default()
        .page(&query, &SortSpec::asc("order"), &request(5, 10))
        .await
        .unwrap();
    assert!(page.is_empty());
    assert!(!page.has_more());
    assert_eq!(page.total(), Some(23));
    assert!(!page.page_info.has_previous);
}

#[tokio::test]
async fn test_numbered_page_runs_one_fetch_and_one_count() {
    let store = memory_store(60);
    let query = store
        .collection(ACTIVITIES)
        .filter(Filter::eq("branchId", "branch-1"));

    let page = HybridPager::default()
        .page(&query, &SortSpec::asc("order"), &request(2, 5))
        .await
        .unwrap();

    assert_eq!(page.total(), Some(20));
    assert_eq!(store.stats().queries(), 1);
    assert_eq!(store.stats().counts(), 1);
    // offset-skipped documents are billed too
    assert_eq!(store.stats().documents_read(), 11);
}

#[tokio::test]
async fn test_count_mode_never_skips_count() {
    let store = memory_store(20);
    let pager = HybridPager::new(KeysetPager::default(), CountMode::Never);

    let page = pager
        .page(&store.collection(ACTIVITIES), &SortSpec::asc("order"), &request(2, 5))
        .await
        .unwrap();
    assert_eq!(page.len(), 5);
    assert_eq!(page.total(), None);
    assert_eq!(store.stats().counts(), 0);
}

#[tokio::test]
async fn test_cursor_switches_to_keyset_mode() {
    let store = memory_store(30);
    let query = store.collection(ACTIVITIES);
    let sort = SortSpec::asc("order");
    let pager = HybridPager::default();

    let first = pager.page(&query, &sort, &request(1, 10)).await.unwrap();
    store.stats().reset();

    let next = request(1, 10).with_cursor(first.next_cursor().unwrap());
    let second = pager.page(&query, &sort, &next).await.unwrap();

    assert_eq!(second.items[0].id(), activity_id(10));
    assert_eq!(second.total(), None);
    assert_eq!(second.page_info.page, None);
    assert_eq!(store.stats().counts(), 0);
}

#[tokio::test]
async fn test_paginator_from_query_string() {
    let store = memory_store(30);
    let paginator = Paginator::new(QueryConfig::default());
    let query = store
        .collection(ACTIVITIES)
        .filter(Filter::eq("isPublished", true));

    let request = paginator.request_from_query_string("?page=2&limit=10&cursor=");
    assert_eq!(request.cursor(), None);

    let page = paginator
        .list_page(&query, &SortSpec::asc("order"), &request, |doc| {
            doc.data()["name"].as_str().unwrap_or_default().to_string()
        })
        .await
        .unwrap();

    assert_eq!(page.total(), Some(24));
    assert_eq!(page.items.first().map(String::as_str), Some("Activity 13"));
    assert!(page.has_more());
}
