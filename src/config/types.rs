//! Declarative resource definitions.

use crate::error::ConfigError;
use crate::schema::{FieldType, RecordSchema};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One resource kind as written in a catalog file.
///
/// ```json
/// { "name": "books", "schema": "Book", "fields": { "title": "string", "published_year": "integer" } }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Routable name and path segment.
    pub name: String,
    /// Display name of the record type.
    pub schema: String,
    /// Store collection; defaults to `name`.
    #[serde(default)]
    pub collection: Option<String>,
    pub fields: IndexMap<String, FieldType>,
    #[serde(default)]
    pub example: Option<serde_json::Value>,
}

impl ResourceConfig {
    pub fn collection_name(&self) -> &str {
        self.collection.as_deref().unwrap_or(&self.name)
    }

    pub fn to_schema(&self) -> Result<RecordSchema, ConfigError> {
        let mut builder = self
            .fields
            .iter()
            .fold(RecordSchema::builder(&self.schema), |b, (name, t)| b.field(name, *t));
        if let Some(example) = &self.example {
            builder = builder.example(example.clone());
        }
        builder.build()
    }
}
