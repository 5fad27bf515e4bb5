//! Catalog validation: naming rules, uniqueness, one collection per resource.

use crate::config::ResourceConfig;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Names taken by the service routes; a resource with one of these would shadow them.
pub const RESERVED_RESOURCE_NAMES: &[&str] = &["health", "ready", "version", "resources"];

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("static pattern"))
}

/// A resource name must be a single lowercase path segment not used by the service routes.
pub fn validate_resource_name(name: &str) -> Result<(), ConfigError> {
    if !name_pattern().is_match(name) {
        return Err(ConfigError::InvalidName(name.to_string()));
    }
    if RESERVED_RESOURCE_NAMES.contains(&name) {
        return Err(ConfigError::ReservedName(name.to_string()));
    }
    Ok(())
}

pub fn validate(resources: &[ResourceConfig]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    let mut collections: HashMap<&str, &str> = HashMap::new();

    for r in resources {
        validate_resource_name(&r.name)?;
        if !names.insert(r.name.as_str()) {
            return Err(ConfigError::DuplicateResource(r.name.clone()));
        }
        let collection = r.collection_name();
        if collection.trim().is_empty() {
            return Err(ConfigError::MissingStore(r.name.clone()));
        }
        if let Some(first) = collections.insert(collection, r.name.as_str()) {
            return Err(ConfigError::DuplicateCollection {
                collection: collection.to_string(),
                first: first.to_string(),
                second: r.name.clone(),
            });
        }
        r.to_schema()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;
    use indexmap::IndexMap;

    fn resource(name: &str, collection: Option<&str>) -> ResourceConfig {
        ResourceConfig {
            name: name.into(),
            schema: "Thing".into(),
            collection: collection.map(String::from),
            fields: IndexMap::from([("label".to_string(), FieldType::String)]),
            example: None,
        }
    }

    #[test]
    fn accepts_distinct_resources() {
        validate(&[resource("books", None), resource("users", None), resource("data", Some("data_filters"))]).unwrap();
    }

    #[test]
    fn rejects_bad_names() {
        for bad in ["", "Books", "books/x", "-books", "my books"] {
            assert!(matches!(validate_resource_name(bad), Err(ConfigError::InvalidName(_))), "{bad}");
        }
        assert!(matches!(validate_resource_name("health"), Err(ConfigError::ReservedName(_))));
        validate_resource_name("graph-nodes_2").unwrap();
    }

    #[test]
    fn rejects_shared_or_missing_collections() {
        let err = validate(&[resource("books", None), resource("novels", Some("books"))]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateCollection { .. }));

        let err = validate(&[resource("books", Some(""))]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingStore(_)));
    }

    #[test]
    fn rejects_reserved_field_names() {
        let mut r = resource("books", None);
        r.fields.insert("id".into(), FieldType::String);
        assert!(matches!(validate(&[r]), Err(ConfigError::ReservedField { .. })));
    }
}
