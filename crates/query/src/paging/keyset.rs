//! Keyset (cursor) pagination.
//!
//! Each page is one ordered, bounded store query. `has_more` is detected by
//! asking for `limit + 1` documents and dropping the probe, so no page ever
//! needs a count. Cursors resume with a two-key `start_after(sort value, id)`,
//! which keeps pages free of duplicates and gaps even when many documents
//! share a sort value.

use tracing::{debug, instrument};

use crate::config::{MAX_PAGE_LIMIT, QueryConfig};
use crate::core::{Query, SortSpec};
use crate::error::QueryResult;
use crate::types::{CursorDirection, Document, Page, PageCursor, PageInfo, decode_cursor};

/// Cursor-based pager over a single-field sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeysetPager {
    max_limit: u32,
}

impl Default for KeysetPager {
    fn default() -> Self {
        Self::new(MAX_PAGE_LIMIT)
    }
}

impl KeysetPager {
    /// Creates a pager that caps page sizes at `max_limit` (itself at most 100).
    pub fn new(max_limit: u32) -> Self {
        Self {
            max_limit: max_limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Creates a pager from the layer configuration.
    pub fn from_config(config: &QueryConfig) -> Self {
        Self::new(config.max_limit)
    }

    /// Clamps a requested page size into `[1, max_limit]`.
    pub fn clamp_limit(&self, limit: i64) -> u32 {
        limit.clamp(1, i64::from(self.max_limit)) as u32
    }

    /// Fetches one page.
    ///
    /// A cursor that does not decode is ignored and the first page is served.
    /// A cursor with [`CursorDirection::Previous`] walks backward from its
    /// position.
    #[instrument(skip(self, query, sort, cursor), fields(backend = query.backend_name(), sort = %sort.field))]
    pub async fn page<Q: Query>(
        &self,
        query: &Q,
        sort: &SortSpec,
        limit: i64,
        cursor: Option<&str>,
    ) -> QueryResult<Page<Document>> {
        let limit = self.clamp_limit(limit);
        let cursor = cursor.and_then(|token| {
            let decoded = decode_cursor(token);
            if decoded.is_none() {
                debug!("Ignoring undecodable cursor, serving first page");
            }
            decoded
        });

        match cursor {
            Some(cursor) if cursor.direction() == CursorDirection::Previous => {
                self.backward(query, sort, limit, &cursor).await
            }
            cursor => self.forward(query, sort, limit, cursor.as_ref()).await,
        }
    }

    /// Fetches a forward page after an already decoded cursor.
    pub(crate) async fn forward<Q: Query>(
        &self,
        query: &Q,
        sort: &SortSpec,
        limit: u32,
        after: Option<&PageCursor>,
    ) -> QueryResult<Page<Document>> {
        let docs = Self::window(query, sort, limit + 1, after).await?;
        let mut page = finish_page(docs, limit, sort);

        if after.is_some() {
            if let Some(first) = page.items.first() {
                let previous = PageCursor::at(first, &sort.field, CursorDirection::Previous);
                page.page_info = page.page_info.with_previous(previous);
            }
        }

        debug!(
            returned = page.len(),
            has_more = page.has_more(),
            "Keyset page fetched"
        );
        Ok(page)
    }

    async fn backward<Q: Query>(
        &self,
        query: &Q,
        sort: &SortSpec,
        limit: u32,
        before: &PageCursor,
    ) -> QueryResult<Page<Document>> {
        let mut docs = Self::window(query, &sort.reversed(), limit + 1, Some(before)).await?;

        // Fewer than a full page plus probe before the cursor: that is the
        // first page, and it must be served forward to stay full.
        if docs.len() <= limit as usize {
            debug!(before = docs.len(), "Backward page reached the start");
            return self.forward(query, sort, limit, None).await;
        }

        docs.truncate(limit as usize);
        docs.reverse();

        let mut info = PageInfo::end(limit);
        if let Some(first) = docs.first() {
            info = info.with_previous(PageCursor::at(first, &sort.field, CursorDirection::Previous));
        }
        if let Some(last) = docs.last() {
            info = info.with_next(PageCursor::at(last, &sort.field, CursorDirection::Next));
        }

        Ok(Page::new(docs, info))
    }

    /// Fetches up to `size` documents in sort order, strictly after `after`.
    ///
    /// This is the raw building block: no clamping and no probe item.
    pub async fn window<Q: Query>(
        query: &Q,
        sort: &SortSpec,
        size: u32,
        after: Option<&PageCursor>,
    ) -> QueryResult<Vec<Document>> {
        let mut query = query.clone().sorted(sort);
        if let Some(cursor) = after {
            query = query.start_after(cursor.sort_value().clone(), cursor.document_id());
        }
        query.limit(size).get().await
    }
}

/// Turns a `limit + 1` fetch into a page: drops the probe and sets the next cursor.
pub(crate) fn finish_page(mut docs: Vec<Document>, limit: u32, sort: &SortSpec) -> Page<Document> {
    let has_more = docs.len() > limit as usize;
    docs.truncate(limit as usize);

    let mut info = PageInfo::end(limit);
    if has_more {
        if let Some(last) = docs.last() {
            info = info.with_next(PageCursor::at(last, &sort.field, CursorDirection::Next));
        }
    }

    Page::new(docs, info)
}
