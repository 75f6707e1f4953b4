//! Tests for keyset pagination.

use unionhall_query::core::{DocumentStore, Filter, Query, SortSpec};
use unionhall_query::paging::KeysetPager;
use unionhall_query::types::{FieldValue, PageCursor, encode_cursor};

use crate::common::*;

// ============================================================================
// Completeness
// ============================================================================

#[tokio::test]
async fn test_scenario_twenty_three_documents() {
    let store = memory_store(23);
    let pager = KeysetPager::default();
    let query = store.collection(ACTIVITIES);
    let sort = SortSpec::asc("order");

    let first = pager.page(&query, &sort, 10, None).await.unwrap();
    assert_eq!(first.len(), 10);
    assert!(first.has_more());
    assert!(first.next_cursor().is_some());
    assert_eq!(first.total(), None);

    let second = pager.page(&query, &sort, 10, first.next_cursor()).await.unwrap();
    assert_eq!(second.len(), 10);
    assert!(second.has_more());
    assert_eq!(second.items[0].id(), activity_id(10));

    let third = pager.page(&query, &sort, 10, second.next_cursor()).await.unwrap();
    assert_eq!(third.len(), 3);
    assert!(!third.has_more());
    assert!(third.next_cursor().is_none());
}

#[tokio::test]
async fn test_walk_visits_every_document_once() {
    let store = memory_store(47);
    let pager = KeysetPager::default();
    let query = store.collection(ACTIVITIES);

    for sort in [SortSpec::asc("createdAt"), SortSpec::desc("createdAt")] {
        let ids = walk_keyset(&pager, &query, &sort, 7, 20).await;
        assert_eq!(ids.len(), 47);
        assert_unique(&ids);
    }
}

#[tokio::test]
async fn test_walk_with_repeated_sort_values() {
    let store = memory_store(30);
    let pager = KeysetPager::default();
    let query = store.collection(ACTIVITIES);

    // branchId takes three values, so every page boundary falls inside a tie
    let ids = walk_keyset(&pager, &query, &SortSpec::desc("branchId"), 4, 20).await;
    assert_eq!(ids.len(), 30);
    assert_unique(&ids);

    let mut expected: Vec<(String, String)> = activities(30)
        .into_iter()
        .map(|(id, data)| (data["branchId"].as_str().unwrap().to_string(), id))
        .collect();
    expected.sort();
    expected.reverse();
    let expected: Vec<String> = expected.into_iter().map(|(_, id)| id).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_walk_respects_filters() {
    let store = memory_store(40);
    let pager = KeysetPager::default();
    let query = store
        .collection(ACTIVITIES)
        .filter(Filter::eq("isPublished", true));

    let ids = walk_keyset(&pager, &query, &SortSpec::asc("order"), 9, 10).await;
    assert_eq!(ids.len(), 32);
    assert!(!ids.contains(&activity_id(0)));
    assert!(!ids.contains(&activity_id(35)));
}

// ============================================================================
// Limits and cursors
// ============================================================================

#[tokio::test]
async fn test_limit_is_clamped() {
    let store = memory_store(150);
    let pager = KeysetPager::default();
    let query = store.collection(ACTIVITIES);
    let sort = SortSpec::asc("order");

    let page = pager.page(&query, &sort, 0, None).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page.page_info.limit, 1);

    let page = pager.page(&query, &sort, 1000, None).await.unwrap();
    assert_eq!(page.len(), 100);
    assert_eq!(page.page_info.limit, 100);
    assert!(page.has_more());
}

#[tokio::test]
async fn test_probe_costs_one_extra_read() {
    let store = memory_store(50);
    let pager = KeysetPager::default();

    pager
        .page(&store.collection(ACTIVITIES), &SortSpec::asc("order"), 10, None)
        .await
        .unwrap();

    assert_eq!(store.stats().queries(), 1);
    assert_eq!(store.stats().counts(), 0);
    assert_eq!(store.stats().documents_read(), 11);
}

#[tokio::test]
async fn test_malformed_cursor_serves_first_page() {
    let store = memory_store(12);
    let pager = KeysetPager::default();
    let query = store.collection(ACTIVITIES);
    let sort = SortSpec::asc("order");

    let expected = page_ids(&pager.page(&query, &sort, 5, None).await.unwrap());
    for bad in ["", "garbage!", "eyJub3QiOiAiYSBjdXJzb3IifQ"] {
        let page = pager.page(&query, &sort, 5, Some(bad)).await.unwrap();
        assert_eq!(page_ids(&page), expected, "cursor {bad:?}");
    }
}

#[tokio::test]
async fn test_hand_built_cursor_resumes_after_position() {
    let store = memory_store(10);
    let pager = KeysetPager::default();
    let query = store.collection(ACTIVITIES);

    let cursor = encode_cursor(&activity_id(6), FieldValue::Integer(6));
    let page = pager
        .page(&query, &SortSpec::asc("order"), 10, Some(&cursor))
        .await
        .unwrap();
    assert_eq!(page_ids(&page), vec![activity_id(7), activity_id(8), activity_id(9)]);
    assert!(page.page_info.has_previous);
}

#[tokio::test]
async fn test_previous_cursor_round_trip() {
    let store = memory_store(25);
    let pager = KeysetPager::default();
    let query = store.collection(ACTIVITIES);
    let sort = SortSpec::desc("createdAt");

    let first = pager.page(&query, &sort, 10, None).await.unwrap();
    let second = pager.page(&query, &sort, 10, first.next_cursor()).await.unwrap();
    let third = pager.page(&query, &sort, 10, second.next_cursor()).await.unwrap();
    assert_eq!(third.len(), 5);

    let previous = third.page_info.previous_cursor.as_deref().unwrap();
    assert!(matches!(
        PageCursor::decode(previous).map(|c| c.direction()),
        Some(unionhall_query::types::CursorDirection::Previous)
    ));

    let back = pager.page(&query, &sort, 10, Some(previous)).await.unwrap();
    assert_eq!(page_ids(&back), page_ids(&second));
    assert!(back.has_more());

    let forward = pager.page(&query, &sort, 10, back.next_cursor()).await.unwrap();
    assert_eq!(page_ids(&forward), page_ids(&third));
}
