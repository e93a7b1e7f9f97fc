//! Canonical query representation
//!
//! A [`QueryDescriptor`] is the fully-specified form of one sub-query:
//! target collection, selector, optional projection, ordered modifiers, and
//! the domain type its rows rehydrate into. Descriptors are built by the
//! normalizer, checked by the validator, and read (never mutated) by the
//! executor and reconciler.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::resolver::ResultType;

/// A batch of named sub-queries, keyed by unique query name
pub type Batch = BTreeMap<String, QueryDescriptor>;

/// Field projection: field name -> include flag
pub type Projection = BTreeMap<String, bool>;

/// Raw input for one sub-query.
///
/// Either a plain filter structure, an ORM criteria object the resolver can
/// convert, or an already-normalized descriptor (which normalization passes
/// through untouched, making it a fixed point).
#[derive(Debug, Clone)]
pub enum RawQuery<C> {
    /// Plain JSON structure: `{collection?, selector|query?, fields?, modifiers?, result_type?}`
    Spec(Value),
    /// ORM criteria object, converted through the criteria resolver
    Criteria(C),
    /// Already-normalized descriptor, passed through unchanged
    Normalized(QueryDescriptor),
}

/// Reference to the domain type used to reconstruct rows.
///
/// Resolution can fail during normalization without failing the call; the
/// unresolved state carries the name that was tried and is reported by the
/// batch validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultTypeRef {
    /// A registered type the resolver can rehydrate with
    Resolved(ResultType),
    /// No registered type was found under the derived name
    Unresolved { derived: String },
}

impl ResultTypeRef {
    /// Returns true if a registered type backs this reference
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResultTypeRef::Resolved(_))
    }

    /// Returns the resolved type handle, if any
    pub fn resolved(&self) -> Option<&ResultType> {
        match self {
            ResultTypeRef::Resolved(t) => Some(t),
            ResultTypeRef::Unresolved { .. } => None,
        }
    }
}

/// A named cursor transformation applied after the base filter/projection.
///
/// Order matters: modifiers are applied sequentially, so `skip` before
/// `limit` and `limit` before `skip` are different queries.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    /// Operation name: `limit`, `skip`, `sort`
    pub name: String,
    /// Operation argument, shipped to the store as-is
    pub argument: Value,
}

impl Modifier {
    /// Creates a modifier
    pub fn new(name: impl Into<String>, argument: Value) -> Self {
        Self {
            name: name.into(),
            argument,
        }
    }

    /// Creates a `limit` modifier
    pub fn limit(count: u64) -> Self {
        Self::new("limit", Value::from(count))
    }

    /// Creates a `skip` modifier
    pub fn skip(count: u64) -> Self {
        Self::new("skip", Value::from(count))
    }

    /// Creates a `sort` modifier from an already-canonical sort value
    pub fn sort(spec: Value) -> Self {
        Self::new("sort", spec)
    }
}

/// Canonical, fully-specified representation of one sub-query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    /// Unique key within the batch; never mutated once assigned
    pub name: String,
    /// Target collection; non-empty after normalization
    pub collection: String,
    /// Opaque filter structure, matched server-side
    pub selector: Value,
    /// Optional field projection
    pub fields: Option<Projection>,
    /// Ordered cursor modifiers
    pub modifiers: Vec<Modifier>,
    /// Domain type reference; must be resolved before execution
    pub result_type: ResultTypeRef,
}

impl QueryDescriptor {
    /// Creates a descriptor with an empty selector and no projection or
    /// modifiers
    pub fn new(
        name: impl Into<String>,
        collection: impl Into<String>,
        result_type: ResultTypeRef,
    ) -> Self {
        Self {
            name: name.into(),
            collection: collection.into(),
            selector: Value::Object(serde_json::Map::new()),
            fields: None,
            modifiers: Vec::new(),
            result_type,
        }
    }
}
