//! Shared fixtures for integration tests

use serde_json::Value;

use multiquery::resolver::ResolverResult;
use multiquery::{CriteriaParts, CriteriaResolver, ResolverError, ResultType, TypeRegistry};

/// A rehydrated domain object: which registered type it came back as, plus
/// the raw row
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub type_name: String,
    pub body: Value,
}

/// Stand-in for an ORM criteria object: it already knows its collection,
/// result type, and stored options
#[derive(Debug, Clone)]
pub struct Criteria {
    pub collection: String,
    pub selector: Value,
    pub type_name: String,
    pub options: Vec<(String, Value)>,
    pub convertible: bool,
}

impl Criteria {
    pub fn new(collection: &str, selector: Value, type_name: &str) -> Self {
        Self {
            collection: collection.to_string(),
            selector,
            type_name: type_name.to_string(),
            options: Vec::new(),
            convertible: true,
        }
    }

    pub fn with_option(mut self, name: &str, argument: Value) -> Self {
        self.options.push((name.to_string(), argument));
        self
    }
}

/// Registry-backed resolver for tests
pub struct TestResolver {
    registry: TypeRegistry,
}

impl TestResolver {
    pub fn with_types(names: &[&str]) -> Self {
        let mut registry = TypeRegistry::new();
        for name in names {
            registry.register(*name);
        }
        Self { registry }
    }
}

impl CriteriaResolver for TestResolver {
    type Criteria = Criteria;
    type Object = Model;

    fn is_convertible(&self, criteria: &Criteria) -> bool {
        criteria.convertible
    }

    fn to_query_parts(&self, criteria: &Criteria) -> ResolverResult<CriteriaParts> {
        Ok(CriteriaParts {
            selector: criteria.selector.clone(),
            collection: criteria.collection.clone(),
            result_type: ResultType::new(&criteria.type_name),
            options: criteria.options.clone(),
        })
    }

    fn resolve_type(&self, type_name: &str) -> Option<ResultType> {
        self.registry.resolve(type_name)
    }

    fn rehydrate(&self, result_type: &ResultType, row: &Value) -> ResolverResult<Model> {
        if !row.is_object() {
            return Err(ResolverError::Rehydration(format!(
                "expected a row object, got: {row}"
            )));
        }
        Ok(Model {
            type_name: result_type.name().to_string(),
            body: row.clone(),
        })
    }
}
