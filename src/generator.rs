//! Endpoint generator: the five record operations for one (schema, store) pair, and the router exposing them.
//!
//! Every resource gets the same control flow; only the schema and the captured store differ.

use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::response::{created, listing, ok, Message};
use crate::schema::{Record, RecordSchema};
use crate::store::{CollectionStore, RecordId, StoreError};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::Value;
use std::sync::Arc;

/// Create/list/get/update/delete bound to one schema and one collection.
#[derive(Debug)]
pub struct ResourceOperations {
    name: String,
    schema: Arc<RecordSchema>,
    store: Arc<dyn CollectionStore>,
}

impl ResourceOperations {
    pub fn new(name: impl Into<String>, schema: Arc<RecordSchema>, store: Arc<dyn CollectionStore>) -> Self {
        Self {
            name: name.into(),
            schema,
            store,
        }
    }

    /// Resource name, also the path segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn collection(&self) -> &str {
        self.store.name()
    }

    fn not_found(&self) -> AppError {
        AppError::NotFound(format!("{} not found", self.schema.name()))
    }

    /// Unparsable ids are indistinguishable from unknown ones.
    fn parse_id(&self, raw: &str) -> Result<RecordId, AppError> {
        RecordId::parse(raw).ok_or_else(|| self.not_found())
    }

    fn rebuild(&self, id: RecordId, stored: &crate::store::Document) -> Result<Record, AppError> {
        self.schema.reconstruct(id, stored).map_err(|e| {
            AppError::Store(StoreError::InvalidDocument {
                collection: self.collection().to_string(),
                reason: format!("record {}: {}", id, e),
            })
        })
    }

    pub async fn create(&self, payload: &Value) -> Result<Record, AppError> {
        let fields = self.schema.validate(payload)?;
        let id = self.store.insert(fields.clone()).await?;
        tracing::debug!(resource = %self.name, %id, "created");
        Ok(Record::new(id, fields))
    }

    /// Snapshot of every record in store iteration order.
    pub async fn list(&self) -> Result<Vec<Record>, AppError> {
        let docs = self.store.find_all().await?;
        docs.iter().map(|(id, d)| self.rebuild(*id, d)).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Record, AppError> {
        let id = self.parse_id(id)?;
        let stored = self.store.find_by_id(&id).await?.ok_or_else(|| self.not_found())?;
        self.rebuild(id, &stored)
    }

    /// Full replacement. An unknown id is reported as not found; nothing is created.
    pub async fn update(&self, id: &str, payload: &Value) -> Result<Record, AppError> {
        let fields = self.schema.validate(payload)?;
        let id = self.parse_id(id)?;
        if !self.store.replace_by_id(&id, fields.clone()).await? {
            return Err(self.not_found());
        }
        tracing::debug!(resource = %self.name, %id, "updated");
        Ok(Record::new(id, fields))
    }

    pub async fn delete(&self, id: &str) -> Result<Message, AppError> {
        let id = self.parse_id(id)?;
        if self.store.delete_by_id(&id).await? == 0 {
            return Err(self.not_found());
        }
        tracing::debug!(resource = %self.name, %id, "deleted");
        Ok(Message {
            message: format!("{} deleted successfully", self.schema.name()),
        })
    }

    /// Routes `/{name}` (GET, POST) and `/{name}/:id` (GET, PUT, DELETE), each handler capturing only this resource.
    pub fn router(self: Arc<Self>) -> Router {
        let collection_path = format!("/{}", self.name);
        let item_path = format!("/{}/:id", self.name);
        Router::new()
            .route(&collection_path, get(list_records).post(create_record))
            .route(
                &item_path,
                get(read_record).put(update_record).delete(delete_record),
            )
            .with_state(self)
    }
}

type Ops = State<Arc<ResourceOperations>>;

async fn create_record(State(ops): Ops, JsonBody(body): JsonBody) -> Result<impl IntoResponse, AppError> {
    Ok(created(ops.create(&body).await?))
}

async fn list_records(State(ops): Ops) -> Result<impl IntoResponse, AppError> {
    Ok(listing(ops.list().await?))
}

async fn read_record(State(ops): Ops, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(ops.get(&id).await?))
}

async fn update_record(
    State(ops): Ops,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(ops.update(&id, &body).await?))
}

async fn delete_record(State(ops): Ops, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(ops.delete(&id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, ValidationError};
    use crate::store::memory::InMemoryCollection;
    use serde_json::json;

    fn books() -> ResourceOperations {
        let schema = RecordSchema::builder("Book")
            .field("title", FieldType::String)
            .field("author", FieldType::String)
            .field("description", FieldType::String)
            .field("published_year", FieldType::Integer)
            .build()
            .unwrap();
        ResourceOperations::new("books", Arc::new(schema), Arc::new(InMemoryCollection::new("books")))
    }

    fn dune() -> Value {
        json!({"title": "Dune", "author": "Herbert", "description": "desert planet", "published_year": 1965})
    }

    #[tokio::test]
    async fn create_then_get_returns_same_record() {
        let ops = books();
        let created = ops.create(&dune()).await.unwrap();
        assert_eq!(Value::Object(created.fields.clone()), dune());
        let fetched = ops.get(&created.id.to_string()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn identical_payloads_get_distinct_ids() {
        let ops = books();
        let a = ops.create(&dune()).await.unwrap();
        let b = ops.create(&dune()).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(ops.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn invalid_create_leaves_store_untouched() {
        let ops = books();
        ops.create(&dune()).await.unwrap();
        let err = ops
            .create(&json!({"title": "Dune", "description": "d", "published_year": 1965}))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(ValidationError::MissingField { field }) => assert_eq!(field, "author"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(ops.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_are_not_found() {
        let ops = books();
        for id in [RecordId::new().to_string(), "not-an-id".to_string(), String::new()] {
            assert!(matches!(ops.get(&id).await, Err(AppError::NotFound(_))));
            assert!(matches!(ops.delete(&id).await, Err(AppError::NotFound(_))));
            assert!(matches!(ops.update(&id, &dune()).await, Err(AppError::NotFound(_))));
        }
        assert!(ops.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_all_fields() {
        let ops = books();
        let created = ops.create(&dune()).await.unwrap();
        let id = created.id.to_string();
        let replacement = json!({"title": "Dune Messiah", "author": "Herbert", "description": "sequel", "published_year": 1969});
        let updated = ops.update(&id, &replacement).await.unwrap();
        assert_eq!(updated.id, created.id);
        let fetched = ops.get(&id).await.unwrap();
        assert_eq!(Value::Object(fetched.fields), replacement);
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let ops = books();
        let err = ops.update("not-an-id", &json!({"title": 1})).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_removes_exactly_one() {
        let ops = books();
        let ids: Vec<String> = {
            let mut v = Vec::new();
            for _ in 0..4 {
                v.push(ops.create(&dune()).await.unwrap().id.to_string());
            }
            v
        };
        let msg = ops.delete(&ids[1]).await.unwrap();
        assert_eq!(msg.message, "Book deleted successfully");
        ops.delete(&ids[3]).await.unwrap();
        assert!(matches!(ops.get(&ids[1]).await, Err(AppError::NotFound(_))));
        assert!(matches!(ops.delete(&ids[1]).await, Err(AppError::NotFound(_))));
        let remaining: Vec<String> = ops.list().await.unwrap().iter().map(|r| r.id.to_string()).collect();
        assert_eq!(remaining, vec![ids[0].clone(), ids[2].clone()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_and_deletes_keep_count_consistent() {
        let ops = Arc::new(books());
        let mut creates = tokio::task::JoinSet::new();
        for year in 0..16 {
            let ops = ops.clone();
            creates.spawn(async move {
                let mut book = dune();
                book["published_year"] = json!(1965 + year);
                ops.create(&book).await.unwrap().id.to_string()
            });
        }
        let mut ids = Vec::new();
        while let Some(id) = creates.join_next().await {
            ids.push(id.unwrap());
        }
        let mut distinct = ids.clone();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), 16);

        // Two racing deletes of the same id: exactly one wins.
        let extra = dune();
        let (a, b, c, d) = tokio::join!(ops.delete(&ids[0]), ops.delete(&ids[0]), ops.delete(&ids[1]), ops.create(&extra));
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|won| **won).count(), 1);
        assert!(matches!(a.err().or(b.err()), Some(AppError::NotFound(_))));
        c.unwrap();
        d.unwrap();

        let listed = ops.list().await.unwrap();
        assert_eq!(listed.len(), 16 - 2 + 1);
        assert!(listed.iter().all(|r| r.id.to_string() != ids[0] && r.id.to_string() != ids[1]));
    }

    #[tokio::test]
    async fn corrupt_stored_document_surfaces_as_store_error() {
        let store = Arc::new(InMemoryCollection::new("books"));
        let bad = json!({"title": "Dune"}).as_object().cloned().unwrap();
        let id = store.insert(bad).await.unwrap();
        let ops = ResourceOperations::new("books", books().schema.clone(), store);
        assert!(matches!(ops.get(&id.to_string()).await, Err(AppError::Store(_))));
        assert!(matches!(ops.list().await, Err(AppError::Store(_))));
    }
}
