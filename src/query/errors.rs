//! Query errors
//!
//! Structural errors raised while turning raw queries into a validated
//! batch. Both abort the whole call before anything is sent to the store.

use thiserror::Error;

/// Result type for normalization and validation
pub type QueryResult<T> = Result<T, QueryError>;

/// Query errors
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// A raw entry is neither a plain structure nor convertible criteria
    #[error("invalid query spec for '{name}': {detail}")]
    InvalidQuerySpec { name: String, detail: String },

    /// One or more descriptors are missing a collection or a resolvable
    /// result type; every defect is listed in one diagnostic
    #[error(
        "invalid batch: missing collection: [{}]; unresolved result type: [{}]",
        .missing_collection.join(", "),
        .unresolved_type.join(", ")
    )]
    InvalidBatch {
        missing_collection: Vec<String>,
        unresolved_type: Vec<String>,
    },
}
