//! Budgeted in-memory keyword search.
//!
//! The document store has no full-text index, so keyword search scans the
//! filtered collection in keyset-ordered windows and applies a predicate in
//! memory. Every call is bounded by a [`SearchBudget`]: it never reads more
//! than `max_docs` documents. When the budget runs out before the collection
//! does, the page's `total` is the number of matches found so far and
//! `is_approximate` is set.

use tracing::{debug, instrument};

use crate::config::QueryConfig;
use crate::core::{Query, SortSpec};
use crate::error::QueryResult;
use crate::paging::keyset::KeysetPager;
use crate::types::{CursorDirection, Document, FieldValue, Page, PageCursor, PageInfo, PageRequest};

/// Read budget for one search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget {
    /// Documents fetched per window.
    pub batch_size: u32,
    /// Documents read per call, at most.
    pub max_docs: u32,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            batch_size: 200,
            max_docs: 1000,
        }
    }
}

impl SearchBudget {
    /// Creates a budget. A zero batch size is raised to 1.
    pub fn new(batch_size: u32, max_docs: u32) -> Self {
        Self {
            batch_size: batch_size.max(1),
            max_docs,
        }
    }

    /// Reads the budget from the layer configuration.
    pub fn from_config(config: &QueryConfig) -> Self {
        Self::new(config.search_batch_size, config.search_max_docs)
    }
}

/// Scans a query in windows and filters documents in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundedBatchSearch {
    keyset: KeysetPager,
    budget: SearchBudget,
}

impl BoundedBatchSearch {
    /// Creates a search with the given page-size cap and budget.
    pub fn new(keyset: KeysetPager, budget: SearchBudget) -> Self {
        Self { keyset, budget }
    }

    /// Creates a search from the layer configuration.
    pub fn from_config(config: &QueryConfig) -> Self {
        Self::new(KeysetPager::from_config(config), SearchBudget::from_config(config))
    }

    /// Returns the read budget.
    pub fn budget(&self) -> SearchBudget {
        self.budget
    }

    /// Returns page `request.page` of the documents matching `predicate`.
    ///
    /// The scan stops as soon as one match beyond the requested page is
    /// known, the collection is exhausted, or the budget is spent. Cursors
    /// in the request are ignored; search pages are addressed by number.
    ///
    /// `is_approximate` is set whenever the scan stopped without seeing a
    /// short window. It is conservative: a collection holding exactly
    /// `max_docs` documents fills every window, so its exact total is still
    /// reported as approximate.
    #[instrument(skip_all, fields(backend = query.backend_name(), sort = %sort.field, page = request.page))]
    pub async fn search<Q, P>(
        &self,
        query: &Q,
        sort: &SortSpec,
        request: &PageRequest,
        predicate: P,
    ) -> QueryResult<Page<Document>>
    where
        Q: Query,
        P: Fn(&Document) -> bool,
    {
        let limit = self.keyset.clamp_limit(i64::from(request.limit));
        let page_number = request.page.max(1);
        let needed = page_number as usize * limit as usize;

        let mut matched: Vec<Document> = Vec::new();
        let mut scanned: u32 = 0;
        let mut after: Option<PageCursor> = None;
        let mut exhausted = false;

        while matched.len() <= needed && scanned < self.budget.max_docs && !exhausted {
            let size = self.budget.batch_size.min(self.budget.max_docs - scanned);
            let window = KeysetPager::window(query, sort, size, after.as_ref()).await?;

            if window.len() < size as usize {
                exhausted = true;
            }
            if let Some(last) = window.last() {
                after = Some(PageCursor::at(last, &sort.field, CursorDirection::Next));
            }
            scanned += window.len() as u32;
            matched.extend(window.into_iter().filter(|doc| predicate(doc)));
        }

        let total = matched.len();
        let has_more = total > needed;
        let start = ((page_number - 1) as usize * limit as usize).min(total);
        let items: Vec<Document> = matched.into_iter().skip(start).take(limit as usize).collect();

        let mut info = PageInfo::end(limit)
            .with_total(total as u64)
            .with_page(page_number);
        info.has_more = has_more;
        info.is_approximate = !exhausted;

        debug!(
            scanned = scanned,
            matched = total,
            exhausted = exhausted,
            "Bounded search finished"
        );
        Ok(Page::new(items, info))
    }
}

/// Case-insensitive substring predicate over string fields.
///
/// ```
/// use unionhall_query::paging::TextMatcher;
/// use unionhall_query::types::Document;
/// use serde_json::json;
///
/// let matcher = TextMatcher::new("Chess", ["name", "description"]);
/// let doc = Document::new("a1", json!({"name": "Weekly chess club"}));
/// assert!(matcher.matches(&doc));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatcher {
    term: String,
    fields: Vec<String>,
}

impl TextMatcher {
    /// Creates a matcher for `term` over the given field paths.
    pub fn new<I, S>(term: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            term: term.trim().to_lowercase(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the term is empty, in which case everything matches.
    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    /// Returns true if any of the fields contains the term.
    pub fn matches(&self, doc: &Document) -> bool {
        if self.term.is_empty() {
            return true;
        }
        self.fields.iter().any(|field| match doc.field(field) {
            FieldValue::String(text) => text.to_lowercase().contains(&self.term),
            _ => false,
        })
    }
}
