//! Result reconciliation
//!
//! Walks the raw per-query responses and turns each into either rehydrated
//! domain objects or a [`QueryFailure`] value. Reconciliation iterates the
//! descriptor set, not the response, so every submitted query gets an
//! output entry even if the wire response dropped one. A failure is data,
//! not control flow: one bad sub-query never discards its siblings'
//! results.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::errors::MultiqueryError;
use crate::query::{Batch, QueryDescriptor};
use crate::resolver::CriteriaResolver;

/// One sub-query failed at the store level.
///
/// Carries the failed query's name, its full normalized descriptor, and the
/// raw response that caused the failure. Implements `Error` for callers who
/// want to propagate it, but this crate only ever places it into the result
/// mapping.
#[derive(Debug, Clone, Error)]
#[error("query '{name}' failed: {response}")]
pub struct QueryFailure {
    /// Name of the failed query
    pub name: String,
    /// The normalized descriptor that was submitted
    pub descriptor: QueryDescriptor,
    /// The raw response (usually an `{"error": ...}` marker)
    pub response: Value,
}

/// Outcome of one sub-query
#[derive(Debug)]
pub enum QueryOutcome<O> {
    /// Rehydrated domain objects, in row order
    Rows(Vec<O>),
    /// The store reported a per-entry failure
    Failed(QueryFailure),
}

impl<O> QueryOutcome<O> {
    /// Returns the rows, if the query succeeded
    pub fn rows(&self) -> Option<&[O]> {
        match self {
            QueryOutcome::Rows(rows) => Some(rows),
            QueryOutcome::Failed(_) => None,
        }
    }

    /// Returns the failure, if the query failed
    pub fn failure(&self) -> Option<&QueryFailure> {
        match self {
            QueryOutcome::Rows(_) => None,
            QueryOutcome::Failed(failure) => Some(failure),
        }
    }

    /// Returns true if the query failed
    pub fn is_failed(&self) -> bool {
        matches!(self, QueryOutcome::Failed(_))
    }
}

/// Reconciles raw responses against the submitted batch
pub struct Reconciler;

impl Reconciler {
    /// Produces an outcome for every descriptor in the batch.
    ///
    /// Error markers and missing responses become [`QueryFailure`] values;
    /// successful row arrays are rehydrated in order through the resolver.
    pub fn reconcile<R: CriteriaResolver>(
        resolver: &R,
        mut raw: BTreeMap<String, Value>,
        batch: &Batch,
    ) -> Result<BTreeMap<String, QueryOutcome<R::Object>>, MultiqueryError> {
        let mut outcomes = BTreeMap::new();
        for (name, descriptor) in batch {
            let response = raw
                .remove(name)
                .unwrap_or_else(|| json!({"error": "no response returned for query"}));
            outcomes.insert(
                name.clone(),
                Self::reconcile_one(resolver, name, descriptor, response)?,
            );
        }
        Ok(outcomes)
    }

    fn reconcile_one<R: CriteriaResolver>(
        resolver: &R,
        name: &str,
        descriptor: &QueryDescriptor,
        response: Value,
    ) -> Result<QueryOutcome<R::Object>, MultiqueryError> {
        let rows = match &response {
            Value::Array(rows) => rows,
            // An error marker, or any non-array shape the routine was never
            // meant to produce.
            _ => {
                warn!(query = name, response = %response, "query failed");
                return Ok(QueryOutcome::Failed(QueryFailure {
                    name: name.to_string(),
                    descriptor: descriptor.clone(),
                    response,
                }));
            }
        };

        let result_type =
            descriptor
                .result_type
                .resolved()
                .ok_or_else(|| MultiqueryError::Rehydration {
                    name: name.to_string(),
                    detail: "descriptor reached reconciliation with an unresolved result type"
                        .to_string(),
                })?;

        let mut objects = Vec::with_capacity(rows.len());
        for row in rows {
            let object = resolver.rehydrate(result_type, row).map_err(|e| {
                MultiqueryError::Rehydration {
                    name: name.to_string(),
                    detail: e.to_string(),
                }
            })?;
            objects.push(object);
        }
        Ok(QueryOutcome::Rows(objects))
    }
}
