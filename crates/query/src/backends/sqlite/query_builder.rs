//! SQL generation for document queries.
//!
//! Documents live as JSON text in one `documents` table, so every field
//! reference becomes `json_extract(data, '$.path')`, with the reserved id
//! path mapped to the `id` column. Keyset positions are emulated with a
//! two-key predicate that follows SQLite's ordering of NULL (smallest in
//! ascending order, last in descending order). Objects and arrays sort as
//! NULL, the same value a cursor records for them.

use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};

use crate::core::{Filter, FilterOp, SortDirection};
use crate::error::{QueryResult, ValidationError};
use crate::types::{DOCUMENT_ID, FieldValue};

/// A SQL statement with numbered parameters.
#[derive(Debug, Clone, Default)]
pub struct SqlFragment {
    /// The SQL text.
    pub sql: String,
    /// Bound parameter values, in placeholder order.
    pub params: Vec<SqlParam>,
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Text parameter.
    String(String),
    /// Integer parameter.
    Integer(i64),
    /// Float parameter.
    Float(f64),
    /// NULL.
    Null,
}

impl From<&FieldValue> for SqlParam {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Null => SqlParam::Null,
            // json_extract yields 1/0 for JSON booleans
            FieldValue::Boolean(b) => SqlParam::Integer(i64::from(*b)),
            FieldValue::Integer(i) => SqlParam::Integer(*i),
            FieldValue::Decimal(d) => SqlParam::Float(*d),
            FieldValue::String(s) => SqlParam::String(s.clone()),
        }
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlParam::String(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlParam::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            SqlParam::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            SqlParam::Null => ToSqlOutput::Owned(SqlValue::Null),
        })
    }
}

impl SqlFragment {
    /// Creates a fragment with no parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter and returns its placeholder.
    pub fn add_param(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("?{}", self.params.len())
    }

    /// Appends SQL text.
    pub fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }
}

/// Builder state shared by the SQLite query type.
#[derive(Debug, Clone, Default)]
pub(crate) struct QuerySpec {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order: Option<(String, SortDirection)>,
    pub limit: Option<u32>,
    pub offset: u64,
    pub start_after: Option<(FieldValue, String)>,
}

/// Returns the SQL expression addressing a field, validating the path.
pub fn field_expr(field: &str) -> QueryResult<String> {
    if field == DOCUMENT_ID {
        return Ok("id".to_string());
    }

    let valid = !field.is_empty()
        && field
            .split('.')
            .all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    if !valid {
        return Err(ValidationError::InvalidFieldPath {
            field: field.to_string(),
        }
        .into());
    }

    Ok(format!("json_extract(data, '$.{field}')"))
}

/// Returns the SQL expression a field sorts by.
///
/// Non-scalar JSON values become NULL so the ORDER BY and keyset predicate
/// agree with the cursor position.
pub(crate) fn sort_expr(field: &str) -> QueryResult<String> {
    let expr = field_expr(field)?;
    if field == DOCUMENT_ID {
        return Ok(expr);
    }
    Ok(format!(
        "(CASE WHEN json_type(data, '$.{field}') IN ('object', 'array') THEN NULL ELSE {expr} END)"
    ))
}

/// Builds `SELECT id, data ...` for a query.
pub(crate) fn build_select(spec: &QuerySpec, max_in_values: usize) -> QueryResult<SqlFragment> {
    let mut frag = SqlFragment::new("SELECT id, data FROM documents WHERE ");
    push_filters(&mut frag, spec, max_in_values)?;

    let (order_expr, direction) = match &spec.order {
        Some((field, direction)) => (sort_expr(field)?, *direction),
        None => ("id".to_string(), SortDirection::Ascending),
    };

    if let Some((value, id)) = &spec.start_after {
        frag.push(" AND ");
        push_keyset(&mut frag, &order_expr, direction, value, id);
    }

    let dir = match direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    };
    if order_expr == "id" {
        frag.push(&format!(" ORDER BY id {dir}"));
    } else {
        frag.push(&format!(" ORDER BY {order_expr} {dir}, id {dir}"));
    }

    let limit = spec.limit.map(i64::from).unwrap_or(-1);
    let limit_ph = frag.add_param(SqlParam::Integer(limit));
    let offset_ph = frag.add_param(SqlParam::Integer(spec.offset.min(i64::MAX as u64) as i64));
    frag.push(&format!(" LIMIT {limit_ph} OFFSET {offset_ph}"));

    Ok(frag)
}

/// Builds `SELECT COUNT(*) ...` over the filters only.
pub(crate) fn build_count(spec: &QuerySpec, max_in_values: usize) -> QueryResult<SqlFragment> {
    let mut frag = SqlFragment::new("SELECT COUNT(*) FROM documents WHERE ");
    push_filters(&mut frag, spec, max_in_values)?;
    Ok(frag)
}

fn push_filters(frag: &mut SqlFragment, spec: &QuerySpec, max_in_values: usize) -> QueryResult<()> {
    let ph = frag.add_param(SqlParam::String(spec.collection.clone()));
    frag.push(&format!("collection = {ph}"));

    for filter in &spec.filters {
        frag.push(" AND ");
        push_filter(frag, filter, max_in_values)?;
    }
    Ok(())
}

fn push_filter(frag: &mut SqlFragment, filter: &Filter, max_in_values: usize) -> QueryResult<()> {
    let values = filter.values();

    if filter.op == FilterOp::ArrayContains {
        if filter.field == DOCUMENT_ID {
            return Err(ValidationError::InvalidFieldPath {
                field: filter.field.clone(),
            }
            .into());
        }
        // Validates the path before it is embedded.
        field_expr(&filter.field)?;
        let mut alternatives = Vec::with_capacity(values.len());
        for value in values {
            let ph = frag.add_param(SqlParam::from(value));
            alternatives.push(ph);
        }
        frag.push(&format!(
            "EXISTS (SELECT 1 FROM json_each(data, '$.{}') WHERE json_each.value IN ({}))",
            filter.field,
            alternatives.join(", ")
        ));
        return Ok(());
    }

    let expr = field_expr(&filter.field)?;

    match filter.op {
        FilterOp::In => {
            if values.len() > max_in_values {
                return Err(ValidationError::InFilterTooLarge {
                    field: filter.field.clone(),
                    len: values.len(),
                    max: max_in_values,
                }
                .into());
            }
            if values.is_empty() {
                frag.push("0");
                return Ok(());
            }
            let placeholders: Vec<String> = values
                .iter()
                .map(|value| frag.add_param(SqlParam::from(value)))
                .collect();
            frag.push(&format!("{expr} IN ({})", placeholders.join(", ")));
        }
        FilterOp::Equal => match values.first() {
            Some(FieldValue::Null) | None => frag.push(&format!("{expr} IS NULL")),
            Some(value) => {
                let ph = frag.add_param(SqlParam::from(value));
                frag.push(&format!("{expr} = {ph}"));
            }
        },
        FilterOp::NotEqual => match values.first() {
            Some(FieldValue::Null) | None => frag.push(&format!("{expr} IS NOT NULL")),
            Some(value) => {
                let ph = frag.add_param(SqlParam::from(value));
                frag.push(&format!("({expr} IS NOT NULL AND {expr} != {ph})"));
            }
        },
        FilterOp::LessThan
        | FilterOp::LessOrEqual
        | FilterOp::GreaterThan
        | FilterOp::GreaterOrEqual => {
            let op = match filter.op {
                FilterOp::LessThan => "<",
                FilterOp::LessOrEqual => "<=",
                FilterOp::GreaterThan => ">",
                _ => ">=",
            };
            let value = values.first().unwrap_or(&FieldValue::Null);
            let ph = frag.add_param(SqlParam::from(value));
            frag.push(&format!("{expr} {op} {ph}"));
        }
        FilterOp::ArrayContains => {}
    }

    Ok(())
}

fn push_keyset(
    frag: &mut SqlFragment,
    expr: &str,
    direction: SortDirection,
    value: &FieldValue,
    id: &str,
) {
    let id_op = match direction {
        SortDirection::Ascending => ">",
        SortDirection::Descending => "<",
    };

    if expr == "id" {
        let ph = frag.add_param(SqlParam::String(id.to_string()));
        frag.push(&format!("id {id_op} {ph}"));
        return;
    }

    let id_ph = frag.add_param(SqlParam::String(id.to_string()));
    match (value.is_null(), direction) {
        (true, SortDirection::Ascending) => frag.push(&format!(
            "(({expr} IS NULL AND id > {id_ph}) OR {expr} IS NOT NULL)"
        )),
        (true, SortDirection::Descending) => {
            frag.push(&format!("({expr} IS NULL AND id < {id_ph})"))
        }
        (false, SortDirection::Ascending) => {
            let value_ph = frag.add_param(SqlParam::from(value));
            frag.push(&format!(
                "({expr} > {value_ph} OR ({expr} = {value_ph} AND id > {id_ph}))"
            ));
        }
        (false, SortDirection::Descending) => {
            let value_ph = frag.add_param(SqlParam::from(value));
            frag.push(&format!(
                "({expr} < {value_ph} OR ({expr} = {value_ph} AND id < {id_ph}) OR {expr} IS NULL)"
            ));
        }
    }
}
