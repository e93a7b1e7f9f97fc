//! Server-side batch routine
//!
//! Native reference implementation of the `multiquery` wire contract, the
//! piece that runs inside the data store. For every batch entry: check the
//! collection exists (the store would otherwise silently return empty
//! results for a nonexistent one), match the selector, apply the optional
//! projection, apply each modifier in order, materialize. Any failure while
//! processing one entry becomes that entry's error marker; the remaining
//! entries still run.
//!
//! [`crate::backend::MemoryBackend`] runs this implementation in-process;
//! `scripts/multiquery.js` is the equivalent payload for stores that
//! evaluate JavaScript server-side.

pub mod cursor;
pub mod matching;

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use self::cursor::Cursor;

/// Routine-level failure: the whole invocation is malformed.
///
/// Per-entry problems never surface here; they become error markers in the
/// response.
#[derive(Debug, Clone, Error)]
pub enum RoutineError {
    #[error("malformed batch: {0}")]
    MalformedBatch(String),
}

/// Read view of the document store the routine runs against
pub trait DocumentStore {
    /// Returns true if the collection exists (even when empty)
    fn has_collection(&self, name: &str) -> bool;

    /// Returns every document in the collection
    fn scan(&self, name: &str) -> Vec<Value>;
}

/// One wire batch entry
#[derive(Debug, Deserialize)]
struct RoutineQuery {
    #[serde(default = "empty_selector")]
    selector: Value,
    collection: String,
    #[serde(default)]
    fields: Option<BTreeMap<String, bool>>,
    #[serde(default)]
    modifiers: Vec<(String, Value)>,
}

fn empty_selector() -> Value {
    json!({})
}

/// Runs the batched-query routine over a store.
///
/// The response maps every input query name to either an ordered row array
/// or an `{"error": ...}` marker.
pub fn run_multiquery(store: &dyn DocumentStore, batch: &Value) -> Result<Value, RoutineError> {
    let Value::Object(entries) = batch else {
        return Err(RoutineError::MalformedBatch(format!(
            "expected an object keyed by query name, got: {batch}"
        )));
    };

    let mut results = Map::with_capacity(entries.len());
    for (name, entry) in entries {
        results.insert(name.clone(), run_one(store, entry));
    }
    Ok(Value::Object(results))
}

fn run_one(store: &dyn DocumentStore, entry: &Value) -> Value {
    match try_run_one(store, entry) {
        Ok(rows) => Value::Array(rows),
        Err(detail) => json!({ "error": detail }),
    }
}

fn try_run_one(store: &dyn DocumentStore, entry: &Value) -> Result<Vec<Value>, String> {
    let query: RoutineQuery = serde_json::from_value(entry.clone())
        .map_err(|e| format!("malformed query entry: {e}"))?;

    if !store.has_collection(&query.collection) {
        return Err(format!("unable to locate collection {}", query.collection));
    }

    let mut rows = Vec::new();
    for document in store.scan(&query.collection) {
        if matching::selector_matches(&document, &query.selector)? {
            rows.push(match &query.fields {
                Some(fields) => project(&document, fields),
                None => document,
            });
        }
    }

    let mut cursor = Cursor::new(rows);
    for (op, argument) in &query.modifiers {
        cursor.apply(op, argument)?;
    }
    Ok(cursor.into_rows())
}

/// Applies a field projection to one document.
///
/// Include mode keeps the flagged fields plus `_id`; a projection with only
/// `false` flags switches to exclude mode and drops the named fields.
fn project(document: &Value, fields: &BTreeMap<String, bool>) -> Value {
    let Value::Object(map) = document else {
        return document.clone();
    };

    let include_mode = fields.values().any(|include| *include);
    let mut projected = Map::new();
    if include_mode {
        for (field, value) in map {
            let keep = field == "_id" || fields.get(field).copied().unwrap_or(false);
            if keep {
                projected.insert(field.clone(), value.clone());
            }
        }
    } else {
        for (field, value) in map {
            if !fields.contains_key(field) {
                projected.insert(field.clone(), value.clone());
            }
        }
    }
    Value::Object(projected)
}
