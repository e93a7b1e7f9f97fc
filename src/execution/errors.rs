//! Execution errors
//!
//! Transport-level failures and script lookup problems. A non-success
//! status from the remote primitive aborts the whole call; per-query store
//! errors never appear here (those are data, handled by the reconciler).

use thiserror::Error;

/// Result type for remote execution
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Execution errors
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The remote primitive reported a non-success status
    #[error("remote execution failed: {0}")]
    Failure(String),

    /// No script with the requested name exists in any configured directory
    #[error("unable to find script '{0}'")]
    ScriptNotFound(String),

    /// A script was requested by name but no script directory is configured
    #[error("no script directory configured")]
    NoScriptDirectory,

    /// Reading a script file failed
    #[error("script io error: {0}")]
    Io(#[from] std::io::Error),
}
