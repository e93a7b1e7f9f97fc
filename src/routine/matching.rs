//! Selector evaluation
//!
//! Matches documents against store-style selectors. Comparisons are strict:
//! no type coercion, ordering operators only compare values of the same
//! kind (numbers with numbers, strings with strings).

use std::cmp::Ordering;

use serde_json::Value;

/// Checks whether a document matches a selector.
///
/// A selector is an object mapping field paths to conditions; all entries
/// must match (AND semantics). A condition is either an operator object
/// (every key starting with `$`) or a literal for exact equality. Fails on
/// malformed selectors (non-object selector, unknown operator, bad operator
/// argument) so the routine can convert the problem into that entry's error
/// marker.
pub fn selector_matches(document: &Value, selector: &Value) -> Result<bool, String> {
    let Value::Object(conditions) = selector else {
        return Err(format!("selector must be an object, got: {selector}"));
    };

    for (path, condition) in conditions {
        if !field_matches(lookup_path(document, path), condition)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Dotted-path field lookup (`"a.b"` reaches into nested objects)
fn lookup_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn field_matches(actual: Option<&Value>, condition: &Value) -> Result<bool, String> {
    if let Value::Object(ops) = condition {
        if !ops.is_empty() && ops.keys().all(|k| k.starts_with('$')) {
            for (op, argument) in ops {
                if !operator_matches(actual, op, argument)? {
                    return Ok(false);
                }
            }
            return Ok(true);
        }
    }

    // Literal condition: exact equality, missing field never matches
    Ok(actual == Some(condition))
}

fn operator_matches(actual: Option<&Value>, op: &str, argument: &Value) -> Result<bool, String> {
    match op {
        "$eq" => Ok(actual == Some(argument)),
        "$ne" => Ok(actual != Some(argument)),
        "$exists" => match argument {
            Value::Bool(expected) => Ok(actual.is_some() == *expected),
            other => Err(format!("$exists requires a bool, got: {other}")),
        },
        "$in" => membership(actual, argument, "$in"),
        "$nin" => membership(actual, argument, "$nin").map(|found| !found),
        "$gt" => Ok(ordered(actual, argument, |o| o == Ordering::Greater)),
        "$gte" => Ok(ordered(actual, argument, |o| o != Ordering::Less)),
        "$lt" => Ok(ordered(actual, argument, |o| o == Ordering::Less)),
        "$lte" => Ok(ordered(actual, argument, |o| o != Ordering::Greater)),
        other => Err(format!("unknown selector operator: {other}")),
    }
}

fn membership(actual: Option<&Value>, argument: &Value, op: &str) -> Result<bool, String> {
    let Value::Array(candidates) = argument else {
        return Err(format!("{op} requires an array, got: {argument}"));
    };
    Ok(actual.is_some_and(|v| candidates.contains(v)))
}

/// Ordering comparison; cross-type or null operands never match
fn ordered(actual: Option<&Value>, bound: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    match compare_same_kind(actual, bound) {
        Some(ordering) => accept(ordering),
        None => false,
    }
}

fn compare_same_kind(actual: Option<&Value>, bound: &Value) -> Option<Ordering> {
    match (actual?, bound) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
                return Some(ai.cmp(&bi));
            }
            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
