//! Remote execution
//!
//! The transport side of the pipeline: script sources with a per-store
//! cache, the black-box [`RemoteExecutor`] boundary, and the batch executor
//! that ships a validated batch in one read-only round trip.

pub mod batch;
pub mod errors;
pub mod remote;
pub mod scripts;

pub use batch::BatchExecutor;
pub use errors::{ExecutionError, ExecutionResult};
pub use remote::{ExecOptions, RemoteExecutor, Runtime};
pub use scripts::{Script, ScriptStore, MULTIQUERY_ROUTINE, MULTIQUERY_SOURCE};
