//! Criteria resolution boundary
//!
//! The ORM layer that produces query criteria and turns raw rows back into
//! domain objects lives outside this crate. [`CriteriaResolver`] is the seam
//! it plugs into: a capability check, a conversion call, a name-to-type
//! lookup, and rehydration.
//!
//! Type resolution is an explicit registry lookup, never reflection. A name
//! with no registered type is a normal, typed "unresolved" state that the
//! batch validator reports.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Resolver errors
#[derive(Debug, Clone, Error)]
pub enum ResolverError {
    /// The criteria value cannot be converted into query parameters
    #[error("unsupported criteria: {0}")]
    UnsupportedCriteria(String),

    /// A raw row could not be turned into a domain object
    #[error("rehydration failed: {0}")]
    Rehydration(String),
}

/// Opaque handle to a registered domain type.
///
/// The core never inspects what a result type *is*; it only carries the
/// handle from normalization to rehydration. The resolver that issued the
/// handle knows how to build objects from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultType(String);

impl ResultType {
    /// Creates a handle for the given registered type name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the registered type name
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Canonical parameter bag extracted from an ORM criteria object.
///
/// `options` preserves the order the criteria stored them in; the normalizer
/// splits the projection out and turns the rest into modifiers.
#[derive(Debug, Clone)]
pub struct CriteriaParts {
    /// Filter structure, passed through to the store untouched
    pub selector: Value,
    /// Target collection name
    pub collection: String,
    /// Domain type the criteria was built for
    pub result_type: ResultType,
    /// Ordered (option name, argument) pairs: fields, sort, limit, skip, ...
    pub options: Vec<(String, Value)>,
}

/// Boundary with the ORM collaborator.
///
/// `Criteria` is whatever the ORM uses to describe a query; `Object` is the
/// domain type rows rehydrate into.
pub trait CriteriaResolver {
    type Criteria;
    type Object;

    /// Returns true if the value can be turned into query parameters
    fn is_convertible(&self, criteria: &Self::Criteria) -> bool;

    /// Converts a criteria object into a canonical parameter bag
    fn to_query_parts(&self, criteria: &Self::Criteria) -> ResolverResult<CriteriaParts>;

    /// Looks up a registered type by derived name
    fn resolve_type(&self, type_name: &str) -> Option<ResultType>;

    /// Builds a domain object from one raw row
    fn rehydrate(&self, result_type: &ResultType, row: &Value) -> ResolverResult<Self::Object>;
}

/// Name-to-type registry supplied by the caller.
///
/// Resolver implementations embed one of these and hand out [`ResultType`]
/// handles from it.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, ResultType>,
}

impl TypeRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type name and returns its handle
    pub fn register(&mut self, name: impl Into<String>) -> ResultType {
        let name = name.into();
        let handle = ResultType::new(name.clone());
        self.types.insert(name, handle.clone());
        handle
    }

    /// Looks up a registered type by name
    pub fn resolve(&self, name: &str) -> Option<ResultType> {
        self.types.get(name).cloned()
    }

    /// Returns true if the name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_register_and_resolve() {
        let mut registry = TypeRegistry::new();
        let dog = registry.register("Dog");

        assert_eq!(dog.name(), "Dog");
        assert_eq!(registry.resolve("Dog"), Some(dog));
        assert!(registry.resolve("Cat").is_none());
    }

    #[test]
    fn test_registry_contains() {
        let mut registry = TypeRegistry::new();
        registry.register("Car");

        assert!(registry.contains("Car"));
        assert!(!registry.contains("Truck"));
    }
}
