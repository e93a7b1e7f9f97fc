//! Top-level errors
//!
//! Pass-through wrapper over the subsystem taxonomies. Structural errors
//! (`Query`) and transport errors (`Execution`) abort the whole call;
//! per-query store failures never appear here; they are data, carried in
//! the result mapping as [`crate::reconcile::QueryFailure`].

use thiserror::Error;

use crate::execution::ExecutionError;
use crate::query::QueryError;

/// Errors that abort a multiquery call
#[derive(Debug, Error)]
pub enum MultiqueryError {
    /// Invalid query spec or invalid batch
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Transport-level failure from the remote primitive
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The resolver could not rebuild a domain object from a raw row
    #[error("unable to rehydrate a row for '{name}': {detail}")]
    Rehydration { name: String, detail: String },
}
