//! Batch validation
//!
//! Confirms every descriptor names a target collection and carries a
//! resolvable result type. All defects are aggregated into one diagnostic so
//! a caller sees every problem in a single pass, not one exception at a
//! time.

use super::descriptor::Batch;
use super::errors::{QueryError, QueryResult};

/// Validates normalized batches before execution
pub struct BatchValidator;

impl BatchValidator {
    /// Checks the whole batch, collecting every defect.
    ///
    /// Fails with a single [`QueryError::InvalidBatch`] listing each query
    /// name missing a collection and each query name whose result type never
    /// resolved.
    pub fn validate(batch: &Batch) -> QueryResult<()> {
        let mut missing_collection = Vec::new();
        let mut unresolved_type = Vec::new();

        for (name, descriptor) in batch {
            if descriptor.collection.is_empty() {
                missing_collection.push(name.clone());
            }
            if !descriptor.result_type.is_resolved() {
                unresolved_type.push(name.clone());
            }
        }

        if missing_collection.is_empty() && unresolved_type.is_empty() {
            Ok(())
        } else {
            Err(QueryError::InvalidBatch {
                missing_collection,
                unresolved_type,
            })
        }
    }
}
