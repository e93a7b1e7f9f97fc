//! Remote execution primitive
//!
//! The single-script server-side execution transport, treated as a black
//! box: hand it code, arguments, and options, get back a result value or a
//! transport-level failure. [`Runtime`] pairs an executor with a
//! [`ScriptStore`] and adds the by-name routine entry points.

use serde_json::Value;
use tracing::debug;

use super::errors::ExecutionResult;
use super::scripts::ScriptStore;

/// Advisory options for one remote execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Hint that the call takes no exclusive lock, so batched lookups do not
    /// block concurrent writers
    pub no_exclusive_lock: bool,
}

impl ExecOptions {
    /// Options for read-only routines
    pub fn readonly() -> Self {
        Self {
            no_exclusive_lock: true,
        }
    }
}

/// Boundary with the server-side execution transport
pub trait RemoteExecutor {
    /// Executes code server-side and returns its result value.
    ///
    /// Fails with [`super::ExecutionError::Failure`] when the underlying
    /// store reports a non-success status for the call.
    fn execute(&self, code: &str, args: &[Value], options: &ExecOptions) -> ExecutionResult<Value>;
}

/// A script store paired with an executor
#[derive(Debug)]
pub struct Runtime<X> {
    scripts: ScriptStore,
    executor: X,
}

impl<X: RemoteExecutor> Runtime<X> {
    /// Creates a runtime with the bundled script store
    pub fn new(executor: X) -> Self {
        Self {
            scripts: ScriptStore::bundled(),
            executor,
        }
    }

    /// Creates a runtime with a custom script store
    pub fn with_scripts(executor: X, scripts: ScriptStore) -> Self {
        Self { scripts, executor }
    }

    /// Returns the script store
    pub fn scripts(&self) -> &ScriptStore {
        &self.scripts
    }

    /// Returns the executor
    pub fn executor(&self) -> &X {
        &self.executor
    }

    /// Runs a stored routine in read-only mode (no exclusive lock)
    pub fn execute_readonly_routine(&self, name: &str, args: &[Value]) -> ExecutionResult<Value> {
        let script = self.scripts.code_for(name)?;
        debug!(routine = name, args = args.len(), "executing readonly routine");
        self.executor
            .execute(&script.source, args, &ExecOptions::readonly())
    }

    /// Runs a stored routine without the read-only hint
    pub fn execute_readwrite_routine(&self, name: &str, args: &[Value]) -> ExecutionResult<Value> {
        let script = self.scripts.code_for(name)?;
        debug!(routine = name, args = args.len(), "executing readwrite routine");
        self.executor
            .execute(&script.source, args, &ExecOptions::default())
    }
}
