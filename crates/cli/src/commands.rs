//! Subcommand implementations.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, bail};
use serde_json::Value;
use tracing::info;
use unionhall_query::backends::sqlite::{SqliteQuery, SqliteStore};
use unionhall_query::core::{DocumentStore, Filter, Query, SortSpec};
use unionhall_query::paging::{Paginator, TextMatcher};
use unionhall_query::types::{Document, FieldValue, PageRequest};

use crate::config::{Command, ListArgs};

/// Runs a command and returns the JSON it prints.
pub async fn run(command: &Command, store: &SqliteStore, paginator: &Paginator) -> anyhow::Result<Value> {
    match command {
        Command::Import {
            collection,
            file,
            id_field,
        } => {
            let records = read_records(file, id_field)?;
            let written = store.insert_many(
                collection,
                records.iter().map(|(id, data)| (id.as_str(), data)),
            )?;
            info!(collection = %collection, written = written, "Import finished");
            Ok(serde_json::json!({ "collection": collection, "imported": written }))
        }

        Command::List(args) => {
            let query = filtered(store, args)?;
            let page = paginator
                .list_page(
                    &query,
                    &SortSpec::parse(&args.sort),
                    &page_request(args, paginator),
                    |doc| doc.to_json_with_id(),
                )
                .await?;
            Ok(serde_json::to_value(page)?)
        }

        Command::Search { list, term, fields } => {
            let query = filtered(store, list)?;
            let matcher = TextMatcher::new(term, fields.iter().cloned());
            let page = paginator
                .search_page(
                    &query,
                    &SortSpec::parse(&list.sort),
                    &page_request(list, paginator),
                    |doc| matcher.matches(doc),
                    |doc| doc.to_json_with_id(),
                )
                .await?;
            Ok(serde_json::to_value(page)?)
        }

        Command::Lookup {
            collection,
            keys,
            by,
        } => {
            let base = store.collection(collection);
            match by {
                Some(field) => {
                    let groups: BTreeMap<String, Vec<Value>> = paginator
                        .lookup_grouped(&base, field, keys)
                        .await?
                        .into_iter()
                        .map(|(key, docs)| (key, docs.iter().map(Document::to_json_with_id).collect()))
                        .collect();
                    Ok(serde_json::to_value(groups)?)
                }
                None => {
                    let found: BTreeMap<String, Value> = paginator
                        .lookup_by_ids(&base, keys)
                        .await?
                        .into_iter()
                        .map(|(id, doc)| (id, doc.to_json_with_id()))
                        .collect();
                    Ok(serde_json::to_value(found)?)
                }
            }
        }
    }
}

fn page_request(args: &ListArgs, paginator: &Paginator) -> PageRequest {
    let limit = args
        .limit
        .unwrap_or_else(|| i64::from(paginator.config().default_limit));
    match args.cursor.as_deref() {
        Some(cursor) if !cursor.is_empty() => PageRequest::after(cursor, limit, paginator.config()),
        _ => PageRequest::new(args.page, limit, paginator.config()),
    }
}

fn filtered(store: &SqliteStore, args: &ListArgs) -> anyhow::Result<SqliteQuery> {
    let mut query = store.collection(&args.collection);
    for raw in &args.filters {
        query = query.filter(parse_filter(raw)?);
    }
    Ok(query)
}

/// Parses `field=value` into an equality filter.
///
/// The value is read as JSON when it parses (`true`, `42`, `"quoted"`) and as
/// a plain string otherwise.
pub fn parse_filter(raw: &str) -> anyhow::Result<Filter> {
    let Some((field, value)) = raw.split_once('=') else {
        bail!("filter '{}' is not of the form field=value", raw);
    };
    let field = field.trim();
    if field.is_empty() {
        bail!("filter '{}' has an empty field name", raw);
    }

    let value = match serde_json::from_str::<Value>(value) {
        Ok(json) => FieldValue::from_json(&json),
        Err(_) => FieldValue::String(value.to_string()),
    };
    Ok(Filter::eq(field, value))
}

/// Reads `(id, body)` records from a JSON array or newline-delimited JSON file.
pub fn read_records(path: &Path, id_field: &str) -> anyhow::Result<Vec<(String, Value)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_records(&text, id_field)
}

/// Parses records from JSON array or newline-delimited JSON text.
pub fn parse_records(text: &str, id_field: &str) -> anyhow::Result<Vec<(String, Value)>> {
    let values: Vec<Value> = if text.trim_start().starts_with('[') {
        serde_json::from_str(text).context("invalid JSON array")?
    } else {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).with_context(|| format!("invalid JSON on line {}", n + 1))
            })
            .collect::<anyhow::Result<_>>()?
    };

    values
        .into_iter()
        .enumerate()
        .map(|(n, value)| split_id(value, id_field).with_context(|| format!("record {}", n + 1)))
        .collect()
}

fn split_id(mut value: Value, id_field: &str) -> anyhow::Result<(String, Value)> {
    let Some(object) = value.as_object_mut() else {
        bail!("not a JSON object");
    };
    let id = match object.remove(id_field) {
        Some(Value::String(id)) if !id.is_empty() => id,
        Some(Value::Number(n)) => n.to_string(),
        _ => bail!("missing string or number field '{}'", id_field),
    };
    Ok((id, value))
}
