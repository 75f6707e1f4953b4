//! Assertion and traversal helpers.

use unionhall_query::core::{Query, SortSpec};
use unionhall_query::paging::KeysetPager;
use unionhall_query::types::{Document, Page};

/// Ids of the documents in a page, in order.
pub fn page_ids(page: &Page<Document>) -> Vec<String> {
    page.items.iter().map(|doc| doc.id().to_string()).collect()
}

/// Walks every keyset page and returns all ids in visit order.
///
/// Panics if a page claims more results without being full, or if the walk
/// does not terminate within `max_pages`.
pub async fn walk_keyset<Q: Query>(
    pager: &KeysetPager,
    query: &Q,
    sort: &SortSpec,
    limit: i64,
    max_pages: usize,
) -> Vec<String> {
    let mut ids = Vec::new();
    let mut cursor: Option<String> = None;

    for _ in 0..max_pages {
        let page = pager
            .page(query, sort, limit, cursor.as_deref())
            .await
            .expect("keyset page failed");
        if page.has_more() {
            assert_eq!(page.len() as i64, limit, "has_more on a short page");
        }
        ids.extend(page_ids(&page));
        match page.page_info.next_cursor {
            Some(next) => cursor = Some(next),
            None => return ids,
        }
    }
    panic!("keyset walk did not finish within {max_pages} pages");
}

/// Asserts a list of ids has no duplicates.
pub fn assert_unique(ids: &[String]) {
    let mut sorted = ids.to_vec();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), ids.len(), "duplicate ids in {ids:?}");
}
