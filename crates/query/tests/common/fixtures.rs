//! Seeded collections for pagination tests.

use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};

use unionhall_query::backends::memory::MemoryStore;

/// Collection used by most fixtures.
pub const ACTIVITIES: &str = "activities";

/// Id of the `i`-th seeded activity.
pub fn activity_id(i: usize) -> String {
    format!("act-{i:03}")
}

/// The `i`-th seeded activity.
///
/// `order` is unique, `branchId` repeats every three documents so sorting on
/// it exercises the id tie-break, and `createdAt` increases by one minute.
pub fn activity(i: usize) -> Value {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let created_at = base + Duration::minutes(i as i64);
    json!({
        "order": i,
        "name": format!("Activity {i}"),
        "description": "Weekly meetup",
        "branchId": format!("branch-{}", i % 3),
        "isPublished": i % 5 != 0,
        "createdAt": created_at.to_rfc3339(),
    })
}

/// All `n` activities as `(id, data)` pairs.
pub fn activities(n: usize) -> Vec<(String, Value)> {
    (0..n).map(|i| (activity_id(i), activity(i))).collect()
}

/// A memory store holding `n` activities.
pub fn memory_store(n: usize) -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_many(ACTIVITIES, activities(n));
    store
}

/// A memory store whose activities named "Chess night" sit at the given positions.
pub fn memory_store_with_matches(n: usize, matches: &[usize]) -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_many(
        ACTIVITIES,
        (0..n).map(|i| {
            let mut data = activity(i);
            if matches.contains(&i) {
                data["name"] = json!(format!("Chess night {i}"));
            }
            (activity_id(i), data)
        }),
    );
    store
}

/// Documents where every fourth one lacks `rank` and the rest share few values.
pub fn ranked_with_gaps(n: usize) -> Vec<(String, Value)> {
    (0..n)
        .map(|i| {
            let data = if i % 4 == 0 {
                json!({ "label": format!("unranked {i}") })
            } else {
                json!({ "rank": (i % 3) as i64, "label": format!("ranked {i}") })
            };
            (format!("doc-{i:02}"), data)
        })
        .collect()
}

#[cfg(feature = "sqlite")]
pub use sqlite::*;

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use unionhall_query::backends::sqlite::SqliteStore;

    /// An in-memory SQLite store holding the given documents.
    pub fn sqlite_store_with(collection: &str, docs: &[(String, Value)]) -> SqliteStore {
        let store = SqliteStore::in_memory().expect("Failed to create SQLite store");
        store
            .insert_many(collection, docs.iter().map(|(id, data)| (id.as_str(), data)))
            .expect("Failed to seed SQLite store");
        store
    }

    /// An in-memory SQLite store holding `n` activities.
    pub fn sqlite_store(n: usize) -> SqliteStore {
        sqlite_store_with(ACTIVITIES, &activities(n))
    }
}
