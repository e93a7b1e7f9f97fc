//! Query normalization
//!
//! Canonicalizes a mapping of query-name -> raw query into a mapping of
//! query-name -> fully-specified descriptor. Plain structures get their
//! collection defaulted from the query name and their result type derived
//! from the collection name; criteria objects are converted through the
//! resolver. Normalization consumes its input and never touches caller
//! state; feeding its own output back in reproduces it exactly.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::debug;

use crate::resolver::CriteriaResolver;

use super::descriptor::{Batch, Modifier, Projection, QueryDescriptor, RawQuery, ResultTypeRef};
use super::errors::{QueryError, QueryResult};
use super::{names, sort};

/// Turns raw queries into canonical descriptors
pub struct Normalizer;

impl Normalizer {
    /// Normalizes every entry of the raw batch.
    ///
    /// Fails with [`QueryError::InvalidQuerySpec`] on the first entry that is
    /// neither a plain structure nor convertible criteria; nothing is sent to
    /// the store in that case.
    pub fn normalize<R: CriteriaResolver>(
        resolver: &R,
        raw: BTreeMap<String, RawQuery<R::Criteria>>,
    ) -> QueryResult<Batch> {
        let mut batch = Batch::new();
        for (name, entry) in raw {
            let descriptor = match entry {
                RawQuery::Normalized(descriptor) => descriptor,
                RawQuery::Spec(value) => Self::from_spec(resolver, &name, &value)?,
                RawQuery::Criteria(criteria) => Self::from_criteria(resolver, &name, &criteria)?,
            };
            batch.insert(name, descriptor);
        }
        debug!(queries = batch.len(), "normalized batch");
        Ok(batch)
    }

    fn from_spec<R: CriteriaResolver>(
        resolver: &R,
        name: &str,
        value: &Value,
    ) -> QueryResult<QueryDescriptor> {
        let Value::Object(map) = value else {
            return Err(invalid(
                name,
                format!("expected a JSON object, got {}", value_kind(value)),
            ));
        };

        let collection = match map.get("collection") {
            None | Some(Value::Null) => name.to_string(),
            Some(Value::String(c)) => c.clone(),
            Some(other) => {
                return Err(invalid(
                    name,
                    format!("collection must be a string, got {}", value_kind(other)),
                ))
            }
        };

        // `query` is the historical key for the filter; `selector` the
        // canonical one.
        let selector = map
            .get("selector")
            .or_else(|| map.get("query"))
            .cloned()
            .unwrap_or_else(|| json!({}));

        let fields = match map.get("fields") {
            None | Some(Value::Null) => None,
            Some(v) => Some(parse_projection(name, v)?),
        };

        let modifiers = match map.get("modifiers") {
            None | Some(Value::Null) => Vec::new(),
            Some(v) => parse_modifiers(name, v)?,
        };

        let result_type = match map.get("result_type") {
            Some(Value::String(type_name)) => resolve_type(resolver, type_name),
            None | Some(Value::Null) => {
                let derived = names::type_name_for_collection(&collection);
                resolve_type(resolver, &derived)
            }
            Some(other) => {
                return Err(invalid(
                    name,
                    format!("result_type must be a string, got {}", value_kind(other)),
                ))
            }
        };

        Ok(QueryDescriptor {
            name: name.to_string(),
            collection,
            selector,
            fields,
            modifiers,
            result_type,
        })
    }

    fn from_criteria<R: CriteriaResolver>(
        resolver: &R,
        name: &str,
        criteria: &R::Criteria,
    ) -> QueryResult<QueryDescriptor> {
        if !resolver.is_convertible(criteria) {
            return Err(invalid(
                name,
                format!(
                    "value of type {} is not convertible into query parameters",
                    std::any::type_name::<R::Criteria>()
                ),
            ));
        }

        let parts = resolver
            .to_query_parts(criteria)
            .map_err(|e| invalid(name, e.to_string()))?;

        // The projection option is split out; everything else becomes a
        // modifier in the order the criteria stored it.
        let mut fields = None;
        let mut modifiers = Vec::new();
        let mut saw_sort = false;
        for (option, argument) in parts.options {
            match option.as_str() {
                "fields" => fields = Some(parse_projection(name, &argument)?),
                "sort" => {
                    saw_sort = true;
                    let canonical = sort::canonicalize(&argument).map_err(|e| invalid(name, e))?;
                    modifiers.push(Modifier::sort(canonical));
                }
                _ => modifiers.push(Modifier::new(option, argument)),
            }
        }
        if !saw_sort {
            modifiers.push(Modifier::sort(json!([])));
        }

        Ok(QueryDescriptor {
            name: name.to_string(),
            collection: parts.collection,
            selector: parts.selector,
            fields,
            modifiers,
            result_type: ResultTypeRef::Resolved(parts.result_type),
        })
    }
}

fn resolve_type<R: CriteriaResolver>(resolver: &R, type_name: &str) -> ResultTypeRef {
    match resolver.resolve_type(type_name) {
        Some(result_type) => ResultTypeRef::Resolved(result_type),
        None => ResultTypeRef::Unresolved {
            derived: type_name.to_string(),
        },
    }
}

fn parse_projection(name: &str, value: &Value) -> QueryResult<Projection> {
    let Value::Object(map) = value else {
        return Err(invalid(
            name,
            format!("fields must be an object, got {}", value_kind(value)),
        ));
    };

    let mut projection = Projection::new();
    for (field, flag) in map {
        let include = match flag {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            other => {
                return Err(invalid(
                    name,
                    format!("field flag for '{field}' must be a bool or number, got {}", value_kind(other)),
                ))
            }
        };
        projection.insert(field.clone(), include);
    }
    Ok(projection)
}

fn parse_modifiers(name: &str, value: &Value) -> QueryResult<Vec<Modifier>> {
    let entries: Vec<(String, Value)> = match value {
        Value::Array(pairs) => {
            let mut entries = Vec::with_capacity(pairs.len());
            for pair in pairs {
                match pair.as_array().map(Vec::as_slice) {
                    Some([Value::String(op), argument]) => {
                        entries.push((op.clone(), argument.clone()));
                    }
                    _ => {
                        return Err(invalid(
                            name,
                            format!("modifier entry must be an [op, argument] pair, got {pair}"),
                        ))
                    }
                }
            }
            entries
        }
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        other => {
            return Err(invalid(
                name,
                format!("modifiers must be an array or object, got {}", value_kind(other)),
            ))
        }
    };

    let mut modifiers = Vec::with_capacity(entries.len());
    for (op, argument) in entries {
        if op == "sort" {
            let canonical = sort::canonicalize(&argument).map_err(|e| invalid(name, e))?;
            modifiers.push(Modifier::sort(canonical));
        } else {
            modifiers.push(Modifier::new(op, argument));
        }
    }
    Ok(modifiers)
}

fn invalid(name: &str, detail: impl Into<String>) -> QueryError {
    QueryError::InvalidQuerySpec {
        name: name.to_string(),
        detail: detail.into(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{CriteriaParts, ResolverResult, ResultType, TypeRegistry};

    struct TestCriteria {
        collection: String,
        selector: Value,
        type_name: String,
        options: Vec<(String, Value)>,
        convertible: bool,
    }

    struct TestResolver {
        registry: TypeRegistry,
    }

    impl TestResolver {
        fn with_types(names: &[&str]) -> Self {
            let mut registry = TypeRegistry::new();
            for name in names {
                registry.register(*name);
            }
            Self { registry }
        }
    }

    impl CriteriaResolver for TestResolver {
        type Criteria = TestCriteria;
        type Object = Value;

        fn is_convertible(&self, criteria: &TestCriteria) -> bool {
            criteria.convertible
        }

        fn to_query_parts(&self, criteria: &TestCriteria) -> ResolverResult<CriteriaParts> {
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

        fn rehydrate(&self, _result_type: &ResultType, row: &Value) -> ResolverResult<Value> {
            Ok(row.clone())
        }
    }

    fn raw_spec(value: Value) -> RawQuery<TestCriteria> {
        RawQuery::Spec(value)
    }

    #[test]
    fn test_default_collection_from_query_name() {
        let resolver = TestResolver::with_types(&["Car"]);
        let raw = BTreeMap::from([("cars".to_string(), raw_spec(json!({"query": {"x": 1}})))]);

        let batch = Normalizer::normalize(&resolver, raw).unwrap();
        let descriptor = &batch["cars"];

        assert_eq!(descriptor.collection, "cars");
        assert_eq!(descriptor.selector, json!({"x": 1}));
        assert_eq!(
            descriptor.result_type,
            ResultTypeRef::Resolved(ResultType::new("Car"))
        );
    }

    #[test]
    fn test_explicit_collection_wins_over_name() {
        let resolver = TestResolver::with_types(&["Dog"]);
        let raw = BTreeMap::from([(
            "canines".to_string(),
            raw_spec(json!({"collection": "dogs", "query": {"deleted_at": null}})),
        )]);

        let batch = Normalizer::normalize(&resolver, raw).unwrap();
        let descriptor = &batch["canines"];

        assert_eq!(descriptor.collection, "dogs");
        assert_eq!(
            descriptor.result_type,
            ResultTypeRef::Resolved(ResultType::new("Dog"))
        );
    }

    #[test]
    fn test_unknown_type_defers_to_validation() {
        let resolver = TestResolver::with_types(&[]);
        let raw = BTreeMap::from([("gizmos".to_string(), raw_spec(json!({})))]);

        let batch = Normalizer::normalize(&resolver, raw).unwrap();

        assert_eq!(
            batch["gizmos"].result_type,
            ResultTypeRef::Unresolved {
                derived: "Gizmo".to_string()
            }
        );
    }

    #[test]
    fn test_non_object_spec_rejected() {
        let resolver = TestResolver::with_types(&[]);
        let raw = BTreeMap::from([("bad".to_string(), raw_spec(json!([1, 2])))]);

        let err = Normalizer::normalize(&resolver, raw).unwrap_err();
        match err {
            QueryError::InvalidQuerySpec { name, detail } => {
                assert_eq!(name, "bad");
                assert!(detail.contains("an array"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_convertible_criteria_rejected() {
        let resolver = TestResolver::with_types(&["Dog"]);
        let raw = BTreeMap::from([(
            "dogs".to_string(),
            RawQuery::Criteria(TestCriteria {
                collection: "dogs".into(),
                selector: json!({}),
                type_name: "Dog".into(),
                options: vec![],
                convertible: false,
            }),
        )]);

        let err = Normalizer::normalize(&resolver, raw).unwrap_err();
        match err {
            QueryError::InvalidQuerySpec { name, detail } => {
                assert_eq!(name, "dogs");
                assert!(detail.contains("TestCriteria"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_criteria_fields_split_from_modifiers() {
        let resolver = TestResolver::with_types(&["Dog"]);
        let raw = BTreeMap::from([(
            "dogs".to_string(),
            RawQuery::Criteria(TestCriteria {
                collection: "dogs".into(),
                selector: json!({"breed": "corgi"}),
                type_name: "Dog".into(),
                options: vec![
                    ("limit".to_string(), json!(5)),
                    ("fields".to_string(), json!({"name": 1, "breed": 1})),
                    ("sort".to_string(), json!({"age": -1})),
                ],
                convertible: true,
            }),
        )]);

        let batch = Normalizer::normalize(&resolver, raw).unwrap();
        let descriptor = &batch["dogs"];

        assert_eq!(
            descriptor.fields,
            Some(Projection::from([
                ("name".to_string(), true),
                ("breed".to_string(), true)
            ]))
        );
        assert_eq!(
            descriptor.modifiers,
            vec![
                Modifier::limit(5),
                Modifier::sort(json!([["age", -1]])),
            ]
        );
    }

    #[test]
    fn test_criteria_without_sort_gets_noop_sort() {
        let resolver = TestResolver::with_types(&["Dog"]);
        let raw = BTreeMap::from([(
            "dogs".to_string(),
            RawQuery::Criteria(TestCriteria {
                collection: "dogs".into(),
                selector: json!({}),
                type_name: "Dog".into(),
                options: vec![("limit".to_string(), json!(3))],
                convertible: true,
            }),
        )]);

        let batch = Normalizer::normalize(&resolver, raw).unwrap();

        assert_eq!(
            batch["dogs"].modifiers,
            vec![Modifier::limit(3), Modifier::sort(json!([]))]
        );
    }

    #[test]
    fn test_normalization_is_a_fixed_point() {
        let resolver = TestResolver::with_types(&["Car", "Dog"]);
        let raw = BTreeMap::from([
            ("cars".to_string(), raw_spec(json!({"query": {"_id": {"$in": [1, 2, 3]}}}))),
            (
                "canines".to_string(),
                raw_spec(json!({"collection": "dogs", "modifiers": [["limit", 2]]})),
            ),
        ]);

        let first = Normalizer::normalize(&resolver, raw).unwrap();
        let again = first
            .clone()
            .into_iter()
            .map(|(name, descriptor)| (name, RawQuery::Normalized(descriptor)))
            .collect();
        let second = Normalizer::normalize(&resolver, again).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_plain_spec_sort_modifier_canonicalized() {
        let resolver = TestResolver::with_types(&["Car"]);
        let raw = BTreeMap::from([(
            "cars".to_string(),
            raw_spec(json!({"modifiers": [["sort", "age"], ["skip", 1]]})),
        )]);

        let batch = Normalizer::normalize(&resolver, raw).unwrap();

        assert_eq!(
            batch["cars"].modifiers,
            vec![Modifier::sort(json!([["age", 1]])), Modifier::skip(1)]
        );
    }
}
