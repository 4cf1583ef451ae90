//! Per-record field projection.

use serde_json::Value;

use crate::backend::Record;

/// Reduce `record` to the requested field subset.
///
/// With `fields = None` the record passes through unchanged. Otherwise the
/// result contains exactly the requested keys, in request order; a key the
/// source record lacks is carried as an explicit `Value::Null` rather than
/// omitted, so "absent in source" stays distinguishable from "never
/// requested".
pub fn project_record(record: &Record, fields: Option<&[String]>) -> Record {
    match fields {
        None => record.clone(),
        Some(fields) => fields
            .iter()
            .map(|field| {
                let value = record.get(field).cloned().unwrap_or(Value::Null);
                (field.clone(), value)
            })
            .collect(),
    }
}
