//! Batch executor
//!
//! Strips descriptors down to their serialization-safe projection, ships
//! the batch to the remote primitive in one read-only `multiquery` call,
//! and hands back the per-query-name raw responses. The validated
//! descriptors themselves are never mutated; `result_type` never crosses
//! the wire.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::query::{Batch, Projection};

use super::errors::{ExecutionError, ExecutionResult};
use super::remote::{RemoteExecutor, Runtime};
use super::scripts::MULTIQUERY_ROUTINE;

/// Wire form of one descriptor: only what the store needs.
///
/// Modifiers serialize as ordered `[op, argument]` pairs so application
/// order survives serialization.
#[derive(Serialize)]
struct WireQuery<'a> {
    selector: &'a Value,
    collection: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a Projection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    modifiers: Vec<(&'a str, &'a Value)>,
}

/// Sends normalized batches to the store
pub struct BatchExecutor;

impl BatchExecutor {
    /// Executes the batch in a single remote round trip.
    ///
    /// Returns the raw per-query-name responses. Fails with
    /// [`ExecutionError::Failure`] if the transport reports a non-success
    /// status or the response is not an object keyed by query name.
    pub fn execute<X: RemoteExecutor>(
        runtime: &Runtime<X>,
        batch: &Batch,
    ) -> ExecutionResult<BTreeMap<String, Value>> {
        let wire = Self::wire_batch(batch)?;
        debug!(queries = batch.len(), "executing multiquery batch");

        let raw = runtime.execute_readonly_routine(MULTIQUERY_ROUTINE, &[wire])?;
        match raw {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(ExecutionError::Failure(format!(
                "expected a per-query response object, got: {other}"
            ))),
        }
    }

    /// Builds the serialization-safe wire projection of the batch
    pub fn wire_batch(batch: &Batch) -> ExecutionResult<Value> {
        let wire: BTreeMap<&str, WireQuery<'_>> = batch
            .iter()
            .map(|(name, descriptor)| {
                let query = WireQuery {
                    selector: &descriptor.selector,
                    collection: &descriptor.collection,
                    fields: descriptor.fields.as_ref(),
                    modifiers: descriptor
                        .modifiers
                        .iter()
                        .map(|m| (m.name.as_str(), &m.argument))
                        .collect(),
                };
                (name.as_str(), query)
            })
            .collect();

        serde_json::to_value(&wire)
            .map_err(|e| ExecutionError::Failure(format!("unserializable batch: {e}")))
    }
}
