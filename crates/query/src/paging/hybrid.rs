//! Hybrid pagination: page numbers with a total, or keyset cursors.
//!
//! Page-number requests are served with `offset` and, unless the count
//! policy says otherwise, a concurrent `count()` so the client can render
//! "page N of M". The store bills every skipped document, so deep page
//! numbers are expensive; clients that only scroll should follow
//! `next_cursor`, which switches the request to keyset mode and drops the
//! total.

use tracing::{debug, instrument};

use crate::config::{CountMode, QueryConfig};
use crate::core::{Query, SortSpec};
use crate::error::QueryResult;
use crate::paging::keyset::{KeysetPager, finish_page};
use crate::types::{CursorDirection, Document, Page, PageCursor, PageRequest, decode_cursor};

/// Pager that serves both page-number and cursor requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HybridPager {
    keyset: KeysetPager,
    count_mode: CountMode,
}

impl Default for HybridPager {
    fn default() -> Self {
        Self::new(KeysetPager::default(), CountMode::Always)
    }
}

impl HybridPager {
    /// Creates a hybrid pager around a keyset pager.
    pub fn new(keyset: KeysetPager, count_mode: CountMode) -> Self {
        Self { keyset, count_mode }
    }

    /// Creates a pager from the layer configuration.
    pub fn from_config(config: &QueryConfig) -> Self {
        Self::new(KeysetPager::from_config(config), config.count_mode)
    }

    /// Returns the keyset pager used for cursor requests.
    pub fn keyset(&self) -> &KeysetPager {
        &self.keyset
    }

    /// Fetches one page.
    ///
    /// A decodable cursor wins over `request.page` and yields a page without
    /// a total. A cursor that does not decode falls back to page 1.
    #[instrument(skip(self, query, sort, request), fields(backend = query.backend_name(), sort = %sort.field, page = request.page))]
    pub async fn page<Q: Query>(
        &self,
        query: &Q,
        sort: &SortSpec,
        request: &PageRequest,
    ) -> QueryResult<Page<Document>> {
        let limit = self.keyset.clamp_limit(i64::from(request.limit));

        let Some(token) = request.cursor() else {
            let numbered = PageRequest {
                page: request.page.max(1),
                limit,
                cursor: None,
            };
            return self.numbered(query, sort, &numbered).await;
        };

        match decode_cursor(token) {
            Some(cursor) if cursor.direction() == CursorDirection::Next => {
                self.keyset.forward(query, sort, limit, Some(&cursor)).await
            }
            Some(_) => self.keyset.page(query, sort, i64::from(limit), Some(token)).await,
            None => {
                debug!("Undecodable cursor, falling back to page 1");
                let first = PageRequest {
                    page: 1,
                    limit,
                    cursor: None,
                };
                self.numbered(query, sort, &first).await
            }
        }
    }

    async fn numbered<Q: Query>(
        &self,
        query: &Q,
        sort: &SortSpec,
        request: &PageRequest,
    ) -> QueryResult<Page<Document>> {
        let (page_number, limit) = (request.page, request.limit);
        let offset = request.offset();
        let fetch = query.clone().sorted(sort).offset(offset).limit(limit + 1);

        let (docs, total) = match self.count_mode {
            CountMode::Always => {
                let (docs, total) = futures::try_join!(fetch.get(), query.count())?;
                (docs, Some(total))
            }
            CountMode::Never => (fetch.get().await?, None),
        };

        let mut page = finish_page(docs, limit, sort);
        page.page_info = page.page_info.with_page(page_number);
        if let Some(total) = total {
            page.page_info = page.page_info.with_total(total);
        }
        if page_number > 1 {
            if let Some(first) = page.items.first() {
                let previous = PageCursor::at(first, &sort.field, CursorDirection::Previous);
                page.page_info = page.page_info.with_previous(previous);
            }
        }

        debug!(
            offset = offset,
            returned = page.len(),
            total = ?total,
            "Numbered page fetched"
        );
        Ok(page)
    }
}
