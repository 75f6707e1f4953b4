//! Page requests parsed from outer API parameters.
//!
//! Resource endpoints accept `page`, `limit` and `cursor` query parameters.
//! A cursor takes precedence over `page` when both are present.

use url::Url;

use crate::config::QueryConfig;

/// A normalized pagination request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-indexed page number (always at least 1).
    pub page: u32,
    /// Page size (always within `[1, max_limit]`).
    pub limit: u32,
    /// Opaque cursor from a previous page.
    pub cursor: Option<String>,
}

impl PageRequest {
    /// Creates a request for a page number, clamping both inputs.
    pub fn new(page: i64, limit: i64, config: &QueryConfig) -> Self {
        Self {
            page: QueryConfig::clamp_page(page),
            limit: config.clamp_limit(limit),
            cursor: None,
        }
    }

    /// Creates a request for the first page.
    pub fn first(limit: i64, config: &QueryConfig) -> Self {
        Self::new(1, limit, config)
    }

    /// Creates a request that resumes from a cursor.
    pub fn after(cursor: impl Into<String>, limit: i64, config: &QueryConfig) -> Self {
        Self::first(limit, config).with_cursor(cursor)
    }

    /// Attaches a cursor; an empty string means no cursor.
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        let cursor = cursor.into();
        self.cursor = if cursor.is_empty() { None } else { Some(cursor) };
        self
    }

    /// Returns the cursor, if one is present.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Returns the number of documents skipped in page-number mode.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Parses `page`, `limit` and `cursor` from an urlencoded query string.
    ///
    /// Missing or unparseable numbers fall back to page 1 and the configured
    /// default limit; out-of-range numbers are clamped.
    pub fn from_query_string(query: &str, config: &QueryConfig) -> Self {
        Self::from_pairs(
            url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()),
            config,
        )
    }

    /// Parses pagination parameters from a request URL.
    pub fn from_url(url: &Url, config: &QueryConfig) -> Self {
        Self::from_pairs(url.query_pairs(), config)
    }

    fn from_pairs<'a, I>(pairs: I, config: &QueryConfig) -> Self
    where
        I: IntoIterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
    {
        let mut page = None;
        let mut limit = None;
        let mut cursor = None;

        for (key, value) in pairs {
            match key.as_ref() {
                "page" => page = value.trim().parse::<i64>().ok(),
                "limit" => limit = value.trim().parse::<i64>().ok(),
                "cursor" => cursor = Some(value.into_owned()),
                _ => {}
            }
        }

        let request = Self::new(
            page.unwrap_or(1),
            limit.unwrap_or(i64::from(config.default_limit)),
            config,
        );
        match cursor {
            Some(cursor) => request.with_cursor(cursor),
            None => request,
        }
    }
}
