//! Loading schedule documents.
//!
//! Upstream services export either a tagged list of records:
//!
//! ```json
//! [{"kind": "session", "id": 1, ...}, {"kind": "task", "id": 9, ...}]
//! ```
//!
//! or a snapshot with one list per kind:
//!
//! ```json
//! {"sessions": [...], "tasks": [...]}
//! ```
//!
//! Snapshots yield sessions first, then tasks. Entries that do not
//! deserialize are logged and skipped so the rest of the document still
//! exports.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};
use crate::raw_record::{RawScheduleRecord, RawSession, RawTask};

/// Reads records from any JSON source.
pub fn load_records<R: Read>(reader: R) -> SourceResult<Vec<RawScheduleRecord>> {
    let document: Value = serde_json::from_reader(reader)?;
    parse_records(document)
}

/// Reads records from a JSON file.
pub fn load_records_from_path(path: &Path) -> SourceResult<Vec<RawScheduleRecord>> {
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_records(BufReader::new(file))
}

/// Converts an already-parsed JSON document into records.
pub fn parse_records(document: Value) -> SourceResult<Vec<RawScheduleRecord>> {
    let records: Vec<RawScheduleRecord> = match document {
        Value::Array(entries) => entries
            .into_iter()
            .enumerate()
            .filter_map(|(position, entry)| decode_entry(entry, "record", position))
            .collect(),
        Value::Object(mut map) => {
            let sessions = take_list(&mut map, "sessions")
                .into_iter()
                .enumerate()
                .filter_map(|(position, entry)| decode_entry::<RawSession>(entry, "session", position))
                .map(RawScheduleRecord::from);
            let tasks = take_list(&mut map, "tasks")
                .into_iter()
                .enumerate()
                .filter_map(|(position, entry)| decode_entry::<RawTask>(entry, "task", position))
                .map(RawScheduleRecord::from);
            sessions.chain(tasks).collect()
        }
        other => return Err(SourceError::Shape(json_type_name(&other))),
    };

    debug!(count = records.len(), "Loaded schedule records");
    Ok(records)
}

fn take_list(map: &mut serde_json::Map<String, Value>, key: &str) -> Vec<Value> {
    match map.remove(key) {
        Some(Value::Array(entries)) => entries,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            warn!(
                key,
                found = json_type_name(&other),
                "Ignoring snapshot list that is not an array"
            );
            Vec::new()
        }
    }
}

fn decode_entry<T: DeserializeOwned>(entry: Value, label: &str, position: usize) -> Option<T> {
    match serde_json::from_value(entry) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(kind = label, position, error = %e, "Skipping malformed entry");
            None
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
