//! Construction of the paged search document.
//!
//! `build_query` is a pure function from filter parameters, snapshot handle,
//! and cursor state to the JSON query the backend executes. It always
//! succeeds given well-typed inputs and has no side effects.

use serde_json::{Value, json};

use crate::backend::{SnapshotHandle, SortKey};

use super::FilterSpec;

/// Build the query document for one page fetch.
///
/// Filter semantics:
/// - `level` becomes a `match` filter when present
/// - start/end bounds become a `range` on `timestamp` with `gte`/`lte` set
///   only for the bounds that were given; the range clause is omitted
///   entirely when neither bound is present
/// - all filters combine under `bool.must`; with no filters at all the
///   query carries an explicit `match_all` rather than an empty must list,
///   which some backends would read as matching nothing
///
/// The sort is always ascending on `timestamp` with `_shard_doc` as a
/// deterministic tiebreaker, so pagination has a total order even when
/// timestamps collide across a page boundary. The cursor is appended as
/// `search_after` only when non-null.
pub fn build_query(
    filters: &FilterSpec,
    snapshot: &SnapshotHandle,
    cursor: Option<&SortKey>,
) -> Value {
    let mut must: Vec<Value> = Vec::new();

    if let Some(level) = &filters.level {
        must.push(json!({ "match": { "level": level } }));
    }

    if filters.start.is_some() || filters.end.is_some() {
        let mut range = serde_json::Map::new();
        if let Some(start) = &filters.start {
            range.insert("gte".to_string(), json!(start));
        }
        if let Some(end) = &filters.end {
            range.insert("lte".to_string(), json!(end));
        }
        must.push(json!({ "range": { "timestamp": range } }));
    }

    let bool_must: Value = if must.is_empty() {
        json!({ "match_all": {} })
    } else {
        Value::Array(must)
    };

    let mut query = json!({
        "size": filters.batch_size,
        "sort": [
            { "timestamp": "asc" },
            { "_shard_doc": "asc" }
        ],
        "pit": {
            "id": snapshot.id,
            "keep_alive": snapshot.keep_alive
        },
        "query": {
            "bool": {
                "must": bool_must
            }
        }
    });

    if let Some(cursor) = cursor {
        query["search_after"] = json!(cursor);
    }

    query
}
