//! The query capability every document store must provide.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::QueryResult;
use crate::types::{Document, FieldValue};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// A single-field ordering. Ties are broken by document id in the same direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    /// The field to order by.
    pub field: String,
    /// The direction to order in.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Ascending order on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending order on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parses `field` or `-field` (descending).
    pub fn parse(s: &str) -> Self {
        match s.strip_prefix('-') {
            Some(field) => Self::desc(field),
            None => Self::asc(s),
        }
    }

    /// Returns the same field ordered the other way.
    pub fn reversed(&self) -> Self {
        Self {
            field: self.field.clone(),
            direction: self.direction.reverse(),
        }
    }
}

/// Filter comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    /// `field == value`
    Equal,
    /// `field != value` (documents missing the field never match)
    NotEqual,
    /// `field < value`
    LessThan,
    /// `field <= value`
    LessOrEqual,
    /// `field > value`
    GreaterThan,
    /// `field >= value`
    GreaterOrEqual,
    /// `field` equals one of the values; cardinality is capped by the store.
    In,
    /// `field` is an array containing the value.
    ArrayContains,
}

/// The operand of a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    /// A single value.
    One(FieldValue),
    /// A list of values, used by [`FilterOp::In`].
    Many(Vec<FieldValue>),
}

impl FilterValue {
    /// Returns the values as a slice.
    pub fn values(&self) -> &[FieldValue] {
        match self {
            FilterValue::One(value) => std::slice::from_ref(value),
            FilterValue::Many(values) => values,
        }
    }
}

/// A `where(field, op, value)` clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Dotted field path, or [`crate::types::DOCUMENT_ID`].
    pub field: String,
    /// The comparison.
    pub op: FilterOp,
    /// The operand.
    pub value: FilterValue,
}

impl Filter {
    /// Creates a filter with a single operand.
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: FilterValue::One(value.into()),
        }
    }

    /// `field == value`
    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOp::Equal, value)
    }

    /// `field != value`
    pub fn ne(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOp::NotEqual, value)
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOp::LessThan, value)
    }

    /// `field <= value`
    pub fn le(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOp::LessOrEqual, value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOp::GreaterThan, value)
    }

    /// `field >= value`
    pub fn ge(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOp::GreaterOrEqual, value)
    }

    /// `field` is one of `values`.
    pub fn is_in<V>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<FieldValue>,
    {
        Self {
            field: field.into(),
            op: FilterOp::In,
            value: FilterValue::Many(values.into_iter().map(Into::into).collect()),
        }
    }

    /// `field` is an array containing `value`.
    pub fn array_contains(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOp::ArrayContains, value)
    }

    /// Returns the operand values.
    pub fn values(&self) -> &[FieldValue] {
        self.value.values()
    }
}

/// A filtered, single-field-ordered view over one collection.
///
/// Queries are immutable values: every builder method consumes the query and
/// returns a new one, so a caller who keeps a clone keeps the original view.
/// Executing a query (`get` or `count`) does not change it.
///
/// # Ordering contract
///
/// After `order_by(field, direction)`, results are ordered by `field` and
/// then by document id, both in `direction`. Without `order_by`, results are
/// ordered by document id ascending.
///
/// `start_after(sort_value, id)` positions the query strictly after the
/// `(sort_value, id)` pair in that two-key order. `offset(n)` then skips `n`
/// documents and `limit(n)` caps the result.
///
/// # Example
///
/// ```ignore
/// let recent = store
///     .collection("activities")
///     .filter(Filter::eq("isPublished", true))
///     .order_by("createdAt", SortDirection::Descending)
///     .limit(20);
/// let docs = recent.get().await?;
/// ```
#[async_trait]
pub trait Query: Clone + Debug + Send + Sync {
    /// Returns the name of the backend executing this query.
    fn backend_name(&self) -> &'static str;

    /// Adds a `where(field, op, value)` clause.
    fn filter(self, filter: Filter) -> Self;

    /// Orders results by a single field.
    fn order_by(self, field: &str, direction: SortDirection) -> Self;

    /// Caps the number of returned documents.
    fn limit(self, limit: u32) -> Self;

    /// Skips documents before returning results.
    fn offset(self, offset: u64) -> Self;

    /// Resumes strictly after the `(sort_value, document_id)` keyset position.
    fn start_after(self, sort_value: FieldValue, document_id: &str) -> Self;

    /// Executes the query.
    async fn get(&self) -> QueryResult<Vec<Document>>;

    /// Counts the documents matching the filters.
    ///
    /// Ordering, limit, offset and keyset position are ignored.
    async fn count(&self) -> QueryResult<u64>;

    /// Orders by a [`SortSpec`].
    fn sorted(self, sort: &SortSpec) -> Self {
        self.order_by(&sort.field, sort.direction)
    }
}
