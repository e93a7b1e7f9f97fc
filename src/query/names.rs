//! Type name derivation
//!
//! Derives the domain type name a collection's rows should rehydrate into:
//! singularize the collection name, then Pascal-case it. `"dogs"` becomes
//! `Dog`, `"blog_entries"` becomes `BlogEntry`. The derived name only feeds
//! a registry lookup; irregular plurals the suffix rules miss simply resolve
//! to nothing and surface through validation.

use convert_case::{Case, Casing};

/// Derives the type name to look up for a collection
pub fn type_name_for_collection(collection: &str) -> String {
    singularize(collection).to_case(Case::Pascal)
}

/// Suffix-rule singularization: `ies` -> `y`, `es` after a sibilant stem
/// dropped, otherwise a trailing `s` dropped.
fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for sibilant in ["ses", "xes", "zes", "ches", "shes"] {
        if word.ends_with(sibilant) {
            return word[..word.len() - 2].to_string();
        }
    }
    if let Some(stem) = word.strip_suffix('s') {
        if !stem.is_empty() {
            return stem.to_string();
        }
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_plural() {
        assert_eq!(type_name_for_collection("dogs"), "Dog");
        assert_eq!(type_name_for_collection("cars"), "Car");
    }

    #[test]
    fn test_ies_plural() {
        assert_eq!(type_name_for_collection("puppies"), "Puppy");
        assert_eq!(type_name_for_collection("categories"), "Category");
    }

    #[test]
    fn test_sibilant_plural() {
        assert_eq!(type_name_for_collection("statuses"), "Status");
        assert_eq!(type_name_for_collection("boxes"), "Box");
        assert_eq!(type_name_for_collection("branches"), "Branch");
    }

    #[test]
    fn test_snake_case_collection() {
        assert_eq!(type_name_for_collection("blog_entries"), "BlogEntry");
        assert_eq!(type_name_for_collection("audit_logs"), "AuditLog");
    }

    #[test]
    fn test_already_singular() {
        assert_eq!(type_name_for_collection("person"), "Person");
    }
}
