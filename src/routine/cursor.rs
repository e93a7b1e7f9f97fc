//! Cursor modifiers
//!
//! A materialized cursor over matched rows. Modifiers transform the cursor
//! one at a time in the order the descriptor listed them, so `skip` before
//! `limit` and `limit` before `skip` stay distinct operations.

use std::cmp::Ordering;

use serde_json::Value;

use crate::query::sort;

/// Rows with ordered modifier application
#[derive(Debug)]
pub struct Cursor {
    rows: Vec<Value>,
}

impl Cursor {
    pub fn new(rows: Vec<Value>) -> Self {
        Self { rows }
    }

    /// Applies one modifier; unknown names and bad arguments are errors the
    /// routine turns into that entry's error marker
    pub fn apply(&mut self, op: &str, argument: &Value) -> Result<(), String> {
        match op {
            "limit" => {
                let count = count_argument("limit", argument)?;
                self.rows.truncate(count);
                Ok(())
            }
            "skip" => {
                let count = count_argument("skip", argument)?;
                self.rows.drain(..count.min(self.rows.len()));
                Ok(())
            }
            "sort" => self.sort(argument),
            other => Err(format!("unknown modifier '{other}'")),
        }
    }

    pub fn into_rows(self) -> Vec<Value> {
        self.rows
    }

    /// Stable multi-field sort over the canonical `[[field, ±1], ...]` form
    fn sort(&mut self, spec: &Value) -> Result<(), String> {
        let Value::Array(entries) = spec else {
            return Err(format!("sort requires the canonical pair form, got: {spec}"));
        };

        let mut keys = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.as_array().map(Vec::as_slice) {
                Some([Value::String(field), dir]) => keys.push((field.clone(), sort::direction(dir)?)),
                _ => return Err(format!("malformed sort entry: {entry}")),
            }
        }
        if keys.is_empty() {
            return Ok(());
        }

        self.rows.sort_by(|a, b| {
            for (field, dir) in &keys {
                let ordering = compare_values(a.get(field), b.get(field));
                let ordering = if *dir < 0 { ordering.reverse() } else { ordering };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
        Ok(())
    }
}

/// Compares two JSON values for sorting.
///
/// Missing sorts before present; otherwise by kind
/// (null < bool < number < string < array < object), then by value within
/// the kind.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a_val), Some(b_val)) => {
            let kind = |v: &Value| -> u8 {
                match v {
                    Value::Null => 0,
                    Value::Bool(_) => 1,
                    Value::Number(_) => 2,
                    Value::String(_) => 3,
                    Value::Array(_) => 4,
                    Value::Object(_) => 5,
                }
            };

            let (a_kind, b_kind) = (kind(a_val), kind(b_val));
            if a_kind != b_kind {
                return a_kind.cmp(&b_kind);
            }

            match (a_val, b_val) {
                (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
                (Value::Number(x), Value::Number(y)) => {
                    let xf = x.as_f64().unwrap_or(0.0);
                    let yf = y.as_f64().unwrap_or(0.0);
                    xf.partial_cmp(&yf).unwrap_or(Ordering::Equal)
                }
                (Value::String(x), Value::String(y)) => x.cmp(y),
                _ => Ordering::Equal,
            }
        }
    }
}

fn count_argument(op: &str, argument: &Value) -> Result<usize, String> {
    argument
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| format!("{op} requires a non-negative integer, got: {argument}"))
}
