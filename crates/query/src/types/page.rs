//! Page types returned by the pagers.

use serde::{Deserialize, Serialize};

use super::cursor::PageCursor;

/// Information about a page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether there are more results after this page.
    pub has_more: bool,

    /// The cursor for the next page, present only when `has_more` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,

    /// Whether there are results before this page.
    #[serde(default)]
    pub has_previous: bool,

    /// The cursor for the previous page, if there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_cursor: Option<String>,

    /// Total count of matching documents, present only when a count was computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    /// True when `total` is a lower bound because a search stopped early.
    #[serde(default)]
    pub is_approximate: bool,

    /// The 1-indexed page number, known only in page-number mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// The effective (clamped) page size.
    pub limit: u32,
}

impl PageInfo {
    /// Creates page info for a final page with the given limit.
    pub fn end(limit: u32) -> Self {
        Self {
            has_more: false,
            next_cursor: None,
            has_previous: false,
            previous_cursor: None,
            total: None,
            is_approximate: false,
            page: None,
            limit,
        }
    }

    /// Sets the next cursor and marks the page as having more results.
    pub fn with_next(mut self, cursor: PageCursor) -> Self {
        self.next_cursor = Some(cursor.encode());
        self.has_more = true;
        self
    }

    /// Sets the previous cursor.
    pub fn with_previous(mut self, cursor: PageCursor) -> Self {
        self.previous_cursor = Some(cursor.encode());
        self.has_previous = true;
        self
    }

    /// Sets the total count.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Sets the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Returns `ceil(total / limit)`, when a total is known.
    pub fn total_pages(&self) -> Option<u64> {
        let limit = u64::from(self.limit.max(1));
        self.total.map(|total| total.div_ceil(limit))
    }
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items in this page, in sort order.
    pub items: Vec<T>,

    /// Pagination information.
    #[serde(flatten)]
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Creates a new page with the given items and page info.
    pub fn new(items: Vec<T>, page_info: PageInfo) -> Self {
        Self { items, page_info }
    }

    /// Returns true if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether more results follow this page.
    pub fn has_more(&self) -> bool {
        self.page_info.has_more
    }

    /// Returns the next-page cursor, if any.
    pub fn next_cursor(&self) -> Option<&str> {
        self.page_info.next_cursor.as_deref()
    }

    /// Returns the total, if one was computed.
    pub fn total(&self) -> Option<u64> {
        self.page_info.total
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_info: self.page_info,
        }
    }
}
