//! Configuration for the query access layer.
//!
//! Store-specific constants (page size bounds, IN-filter cardinality, count
//! policy and search budgets) live here rather than as literals, so the
//! layer stays store-agnostic. Every field has a serde default, so a partial
//! configuration file deserializes cleanly.
//!
//! # Example
//!
//! ```
//! use unionhall_query::config::{CountMode, QueryConfig};
//!
//! let config = QueryConfig {
//!     default_limit: 20,
//!     count_mode: CountMode::Never,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, ValidationError};

/// Hard upper bound for any page size, whatever the configuration says.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Whether page-number requests also run a count query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CountMode {
    /// Run a count for every page-number request.
    #[default]
    Always,
    /// Never count; pages carry no total.
    Never,
}

/// Configuration for pagers, lookups and searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Page size used when a request does not specify one.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Largest page size a request may ask for (at most [`MAX_PAGE_LIMIT`]).
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,

    /// Maximum number of values the store accepts in one IN filter.
    #[serde(default = "default_in_filter_max")]
    pub in_filter_max: usize,

    /// Documents fetched per batch by the bounded search.
    #[serde(default = "default_search_batch_size")]
    pub search_batch_size: u32,

    /// Documents the bounded search may read per call.
    #[serde(default = "default_search_max_docs")]
    pub search_max_docs: u32,

    /// Count policy for page-number requests.
    #[serde(default)]
    pub count_mode: CountMode,
}

fn default_limit() -> u32 {
    25
}

fn default_max_limit() -> u32 {
    MAX_PAGE_LIMIT
}

fn default_in_filter_max() -> usize {
    10
}

fn default_search_batch_size() -> u32 {
    200
}

fn default_search_max_docs() -> u32 {
    1000
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            in_filter_max: default_in_filter_max(),
            search_batch_size: default_search_batch_size(),
            search_max_docs: default_search_max_docs(),
            count_mode: CountMode::default(),
        }
    }
}

impl QueryConfig {
    /// Clamps a requested page size into `[1, max_limit]`.
    ///
    /// A `max_limit` outside `[1, MAX_PAGE_LIMIT]` is itself clamped, so an
    /// unvalidated configuration can never produce an out-of-range store call.
    pub fn clamp_limit(&self, limit: i64) -> u32 {
        let max = self.max_limit.clamp(1, MAX_PAGE_LIMIT);
        limit.clamp(1, i64::from(max)) as u32
    }

    /// Clamps a requested page number to at least 1.
    pub fn clamp_page(page: i64) -> u32 {
        page.clamp(1, i64::from(u32::MAX)) as u32
    }

    /// Validates the configuration and returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.max_limit == 0 || self.max_limit > MAX_PAGE_LIMIT {
            errors.push(format!(
                "Max limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            ));
        }

        if self.default_limit == 0 {
            errors.push("Default limit cannot be 0".to_string());
        }

        if self.default_limit > self.max_limit {
            errors.push("Default limit cannot exceed max limit".to_string());
        }

        if self.in_filter_max == 0 {
            errors.push("IN filter cardinality cannot be 0".to_string());
        }

        if self.search_batch_size == 0 {
            errors.push("Search batch size cannot be 0".to_string());
        }

        if self.search_max_docs == 0 {
            errors.push("Search max docs cannot be 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validates the configuration, folding all problems into one error.
    pub fn ensure_valid(&self) -> Result<(), QueryError> {
        self.validate().map_err(|errors| {
            ValidationError::InvalidConfig {
                message: errors.join("; "),
            }
            .into()
        })
    }
}
