//! In-memory backend
//!
//! A document store and remote executor in one process, running the native
//! routine implementation. Lets the full pipeline, wire serialization
//! included, execute hermetically in tests and demos, the same way a
//! stubbed runtime stands in for a real one.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::execution::{ExecOptions, ExecutionError, ExecutionResult, RemoteExecutor, MULTIQUERY_SOURCE};
use crate::routine::{run_multiquery, DocumentStore};

/// In-process document store that executes the bundled routine
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: RwLock<BTreeMap<String, Vec<Value>>>,
}

impl MemoryBackend {
    /// Creates an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection, leaving an existing one untouched
    pub fn create_collection(&self, name: impl Into<String>) {
        self.read_write().entry(name.into()).or_default();
    }

    /// Inserts a document, creating the collection if needed
    pub fn insert(&self, collection: impl Into<String>, document: Value) {
        self.read_write()
            .entry(collection.into())
            .or_default()
            .push(document);
    }

    fn read_write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Vec<Value>>> {
        self.collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_only(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Vec<Value>>> {
        self.collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentStore for MemoryBackend {
    fn has_collection(&self, name: &str) -> bool {
        self.read_only().contains_key(name)
    }

    fn scan(&self, name: &str) -> Vec<Value> {
        self.read_only().get(name).cloned().unwrap_or_default()
    }
}

impl RemoteExecutor for MemoryBackend {
    /// Runs the bundled `multiquery` routine natively; any other code is an
    /// execution failure, like an unknown command on a real store.
    fn execute(&self, code: &str, args: &[Value], _options: &ExecOptions) -> ExecutionResult<Value> {
        if code != MULTIQUERY_SOURCE {
            return Err(ExecutionError::Failure(
                "memory backend only executes the bundled multiquery routine".into(),
            ));
        }
        let batch = args
            .first()
            .ok_or_else(|| ExecutionError::Failure("missing batch argument".into()))?;
        run_multiquery(self, batch).map_err(|e| ExecutionError::Failure(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collections_and_scan() {
        let backend = MemoryBackend::new();
        backend.create_collection("empty");
        backend.insert("dogs", json!({"_id": "1"}));

        assert!(backend.has_collection("empty"));
        assert!(backend.has_collection("dogs"));
        assert!(!backend.has_collection("cats"));
        assert_eq!(backend.scan("dogs"), vec![json!({"_id": "1"})]);
        assert!(backend.scan("empty").is_empty());
    }

    #[test]
    fn test_executes_only_the_bundled_routine() {
        let backend = MemoryBackend::new();

        let err = backend
            .execute("function other() {}", &[json!({})], &ExecOptions::readonly())
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Failure(_)));

        let response = backend
            .execute(MULTIQUERY_SOURCE, &[json!({})], &ExecOptions::readonly())
            .unwrap();
        assert_eq!(response, json!({}));
    }
}
