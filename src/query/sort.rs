//! Canonical sort representation
//!
//! The store's canonical multi-field sort form is an ordered array of
//! `[field, direction]` pairs with `1` ascending and `-1` descending, e.g.
//! `[["age", -1], ["name", 1]]`. ORM criteria hand their sort option over in
//! looser shapes; this module folds them all into the canonical form. An
//! absent sort canonicalizes to the empty array, which the cursor treats as
//! a no-op.

use serde_json::{json, Value};

/// Canonicalizes a sort argument into the multi-field pair form.
///
/// Accepted shapes:
/// - `null` / missing: empty no-op sort
/// - `"age"`: single ascending field
/// - `["age", "name"]`: multiple ascending fields
/// - `[["age", -1], ["name", "asc"]]`: explicit pairs
/// - `{"age": -1}`: field-to-direction object
pub fn canonicalize(arg: &Value) -> Result<Value, String> {
    match arg {
        Value::Null => Ok(json!([])),
        Value::String(field) => Ok(json!([[field, 1]])),
        Value::Array(entries) => {
            let mut pairs = Vec::with_capacity(entries.len());
            for entry in entries {
                pairs.push(canonical_pair(entry)?);
            }
            Ok(Value::Array(pairs))
        }
        Value::Object(map) => {
            let mut pairs = Vec::with_capacity(map.len());
            for (field, dir) in map {
                pairs.push(json!([field, direction(dir)?]));
            }
            Ok(Value::Array(pairs))
        }
        other => Err(format!("unsupported sort argument: {other}")),
    }
}

fn canonical_pair(entry: &Value) -> Result<Value, String> {
    match entry {
        Value::String(field) => Ok(json!([field, 1])),
        Value::Array(pair) => match pair.as_slice() {
            [Value::String(field)] => Ok(json!([field, 1])),
            [Value::String(field), dir] => Ok(json!([field, direction(dir)?])),
            _ => Err(format!("unsupported sort entry: {entry}")),
        },
        other => Err(format!("unsupported sort entry: {other}")),
    }
}

/// Normalizes a direction value to `1` or `-1`
pub fn direction(dir: &Value) -> Result<i64, String> {
    match dir {
        Value::Number(n) => match n.as_i64() {
            Some(v) if v >= 0 => Ok(1),
            Some(_) => Ok(-1),
            None => Err(format!("unsupported sort direction: {dir}")),
        },
        Value::String(s) => match s.as_str() {
            "asc" | "ascending" => Ok(1),
            "desc" | "descending" => Ok(-1),
            _ => Err(format!("unsupported sort direction: {s}")),
        },
        other => Err(format!("unsupported sort direction: {other}")),
    }
}
