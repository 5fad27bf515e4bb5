//! Record schemas: named, ordered field sets that validate payloads and rebuild stored records.

use crate::error::ConfigError;
use crate::store::{Document, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Field names reserved for the record identifier.
pub const RESERVED_FIELDS: &[&str] = &["id", "_id"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[serde(alias = "str")]
    String,
    #[serde(alias = "int")]
    Integer,
    Float,
    #[serde(alias = "bool")]
    Boolean,
    /// Open string-keyed mapping; any JSON object is accepted.
    #[serde(alias = "dict", alias = "map")]
    Object,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
        }
    }

    pub fn accepts(&self, v: &Value) -> bool {
        match self {
            FieldType::String => v.is_string(),
            // Stored integers are signed 64-bit; larger values cannot be written.
            FieldType::Integer => v.is_i64(),
            FieldType::Float => v.is_f64() || v.is_i64(),
            FieldType::Boolean => v.is_boolean(),
            FieldType::Object => v.is_object(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload rejected by a schema. Always names the offending field when there is one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("body must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },
    #[error("{field} is required")]
    MissingField { field: String },
    #[error("{field} must be {expected}, got {found}")]
    WrongType {
        field: String,
        expected: FieldType,
        found: &'static str,
    },
}

impl ValidationError {
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::NotAnObject { .. } => None,
            ValidationError::MissingField { field } | ValidationError::WrongType { field, .. } => Some(field),
        }
    }
}

fn type_name_of_json(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(n) if n.is_i64() => "integer",
        Value::Number(_) => "integer above i64 range",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
}

/// One persisted instance of a schema. Serializes as the schema fields plus `id`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Document,
}

impl Record {
    pub fn new(id: RecordId, fields: Document) -> Self {
        Self { id, fields }
    }
}

#[derive(Clone, Debug)]
pub struct RecordSchema {
    name: String,
    fields: Vec<FieldDef>,
    example: Option<Value>,
}

impl RecordSchema {
    pub fn builder(name: impl Into<String>) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            example: None,
        }
    }

    /// Display name used in messages (e.g. "Book").
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn example(&self) -> Option<&Value> {
        self.example.as_ref()
    }

    /// Check a request body and return the canonical mapping: declared fields only, in declaration order.
    pub fn validate(&self, payload: &Value) -> Result<Document, ValidationError> {
        let obj = payload.as_object().ok_or(ValidationError::NotAnObject {
            found: type_name_of_json(payload),
        })?;
        self.canonicalize(obj)
    }

    /// Rebuild a record from a stored mapping and its identifier.
    pub fn reconstruct(&self, id: RecordId, stored: &Document) -> Result<Record, ValidationError> {
        Ok(Record::new(id, self.canonicalize(stored)?))
    }

    fn canonicalize(&self, obj: &Document) -> Result<Document, ValidationError> {
        let mut out = Document::new();
        for def in &self.fields {
            let v = obj.get(&def.name).ok_or_else(|| ValidationError::MissingField {
                field: def.name.clone(),
            })?;
            if !def.field_type.accepts(v) {
                return Err(ValidationError::WrongType {
                    field: def.name.clone(),
                    expected: def.field_type,
                    found: type_name_of_json(v),
                });
            }
            out.insert(def.name.clone(), v.clone());
        }
        Ok(out)
    }

    /// JSON description for the resource index.
    pub fn describe(&self) -> Value {
        let fields: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), Value::String(f.field_type.as_str().to_string())))
            .collect();
        serde_json::json!({
            "name": self.name,
            "fields": fields,
            "example": self.example,
        })
    }
}

pub struct RecordSchemaBuilder {
    name: String,
    fields: Vec<FieldDef>,
    example: Option<Value>,
}

impl RecordSchemaBuilder {
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            field_type,
        });
        self
    }

    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn build(self) -> Result<RecordSchema, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation("schema name must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for f in &self.fields {
            if RESERVED_FIELDS.contains(&f.name.as_str()) {
                return Err(ConfigError::ReservedField {
                    schema: self.name.clone(),
                    field: f.name.clone(),
                });
            }
            if !seen.insert(f.name.as_str()) {
                return Err(ConfigError::DuplicateField {
                    schema: self.name.clone(),
                    field: f.name.clone(),
                });
            }
        }
        Ok(RecordSchema {
            name: self.name,
            fields: self.fields,
            example: self.example,
        })
    }
}
