//! multiquery - batched find-style queries in a single round trip
//!
//! Batches multiple independent queries against a script-capable document
//! store into one server-side invocation. Queries are normalized into
//! canonical descriptors, validated as a batch, executed by a fixed remote
//! routine, and reconciled back into per-query results or per-query
//! failure values, so one bad sub-query never discards its siblings.

pub mod backend;
pub mod client;
pub mod errors;
pub mod execution;
pub mod query;
pub mod reconcile;
pub mod resolver;
pub mod routine;

pub use backend::MemoryBackend;
pub use client::Multiquery;
pub use errors::MultiqueryError;
pub use execution::{
    BatchExecutor, ExecOptions, ExecutionError, RemoteExecutor, Runtime, Script, ScriptStore,
    MULTIQUERY_ROUTINE,
};
pub use query::{
    Batch, BatchValidator, Modifier, Normalizer, Projection, QueryDescriptor, QueryError, RawQuery,
    ResultTypeRef,
};
pub use reconcile::{QueryFailure, QueryOutcome, Reconciler};
pub use resolver::{CriteriaParts, CriteriaResolver, ResolverError, ResultType, TypeRegistry};
