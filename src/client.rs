//! Multiquery client
//!
//! The caller-facing facade over the pipeline: normalize the raw queries,
//! validate the batch, execute it in one remote round trip, reconcile the
//! responses. Each call is independent; there is no shared state between
//! calls beyond the script cache inside the runtime.

use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::MultiqueryError;
use crate::execution::{BatchExecutor, RemoteExecutor, Runtime, ScriptStore};
use crate::query::{BatchValidator, Normalizer, RawQuery};
use crate::reconcile::{QueryOutcome, Reconciler};
use crate::resolver::CriteriaResolver;

/// Batched query client over a resolver and a remote executor
#[derive(Debug)]
pub struct Multiquery<R, X> {
    resolver: R,
    runtime: Runtime<X>,
}

impl<R: CriteriaResolver, X: RemoteExecutor> Multiquery<R, X> {
    /// Creates a client with the bundled script store
    pub fn new(resolver: R, executor: X) -> Self {
        Self {
            resolver,
            runtime: Runtime::new(executor),
        }
    }

    /// Creates a client with a custom script store
    pub fn with_scripts(resolver: R, executor: X, scripts: ScriptStore) -> Self {
        Self {
            resolver,
            runtime: Runtime::with_scripts(executor, scripts),
        }
    }

    /// Returns the criteria resolver
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Returns the execution runtime
    pub fn runtime(&self) -> &Runtime<X> {
        &self.runtime
    }

    /// Executes a batch of named queries in a single round trip.
    ///
    /// Every submitted query name appears in the result, mapped to either
    /// its rehydrated rows or a per-query failure value. An empty batch
    /// short-circuits without touching the store.
    pub fn multiquery(
        &self,
        raw: BTreeMap<String, RawQuery<R::Criteria>>,
    ) -> Result<BTreeMap<String, QueryOutcome<R::Object>>, MultiqueryError> {
        if raw.is_empty() {
            debug!("empty batch, skipping execution");
            return Ok(BTreeMap::new());
        }

        let batch = Normalizer::normalize(&self.resolver, raw)?;
        BatchValidator::validate(&batch)?;
        let responses = BatchExecutor::execute(&self.runtime, &batch)?;
        Reconciler::reconcile(&self.resolver, responses, &batch)
    }
}
