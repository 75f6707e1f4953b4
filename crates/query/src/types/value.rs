//! Field values and documents.
//!
//! [`FieldValue`] is the scalar currency of the layer: it is what a document
//! sorts by, what filters compare against, and what a cursor remembers.
//! [`Document`] is the opaque record a store returns.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved field path that addresses the document id instead of a data field.
pub const DOCUMENT_ID: &str = "__id__";

/// A scalar field value used for sorting, filtering and cursors.
///
/// Values of different kinds follow a fixed total order:
/// `Null < Boolean < numbers < String`. Integers and decimals compare
/// numerically with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Missing, null, or non-scalar value.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// Integral numeric value.
    Integer(i64),
    /// Floating point numeric value.
    Decimal(f64),
    /// String value (timestamps are stored as RFC 3339 strings).
    String(String),
}

impl FieldValue {
    /// Converts a JSON value into a field value.
    ///
    /// Arrays and objects are not sortable and map to [`FieldValue::Null`].
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n.as_f64().map(FieldValue::Decimal).unwrap_or(FieldValue::Null),
            },
            Value::String(s) => FieldValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => FieldValue::Null,
        }
    }

    /// Converts the field value back into JSON.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Decimal(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::String(s) => Value::String(s.clone()),
        }
    }

    /// Returns true if this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Returns the value as a grouping key, or `None` for null.
    pub fn as_key(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Boolean(_) => 1,
            FieldValue::Integer(_) | FieldValue::Decimal(_) => 2,
            FieldValue::String(_) => 3,
        }
    }

    /// Compares two values under the cross-kind total order.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Decimal(b)) => (*a as f64).total_cmp(b),
            (FieldValue::Decimal(a), FieldValue::Integer(b)) => a.total_cmp(&(*b as f64)),
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => a.total_cmp(b),
            (FieldValue::String(a), FieldValue::String(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Integer(n as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Decimal(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<()> for FieldValue {
    fn from(_: ()) -> Self {
        FieldValue::Null
    }
}

/// A record returned by a document store.
///
/// The layer only relies on the id and on the value of the active sort
/// field; the content is resource-specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    data: Value,
}

impl Document {
    /// Creates a document.
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Returns the document id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the document content.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Consumes the document and returns its content.
    pub fn into_data(self) -> Value {
        self.data
    }

    /// Returns the raw JSON at a dotted field path, if present.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.data, |current, segment| current.get(segment))
    }

    /// Resolves a dotted field path (`address.city`) to a field value.
    ///
    /// The reserved path [`DOCUMENT_ID`] resolves to the document id.
    pub fn field(&self, path: &str) -> FieldValue {
        if path == DOCUMENT_ID {
            return FieldValue::String(self.id.clone());
        }
        self.get(path)
            .map(FieldValue::from_json)
            .unwrap_or(FieldValue::Null)
    }

    /// Returns the content with the id merged in under `"id"`.
    ///
    /// This is the shape most resource handlers hand to their DTO mappers.
    pub fn to_json_with_id(&self) -> Value {
        let mut value = self.data.clone();
        if let Value::Object(map) = &mut value {
            map.insert("id".to_string(), Value::String(self.id.clone()));
        }
        value
    }
}
