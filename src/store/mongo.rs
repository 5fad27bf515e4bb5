//! MongoDB backend. Documents are stored with the record identifier in `_id`.

use crate::store::{CollectionStore, Document, RecordId, StoreBackend, StoreError, StoreResult};
use async_trait::async_trait;
use bson::{de::deserialize_from_bson, doc, ser::serialize_to_bson, Bson};
use futures::TryStreamExt;
use mongodb::{options::ClientOptions, Client, Collection};
use std::sync::Arc;

#[derive(Debug)]
pub struct MongoBackend {
    client: Client,
    database: String,
}

impl MongoBackend {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    /// Parse the connection string and build a client. The driver connects lazily.
    pub async fn connect(uri: &str, database: &str) -> StoreResult<Self> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))?;
        let client = Client::with_options(options).map_err(|e| StoreError::Initialization(e.to_string()))?;
        tracing::info!(database = %database, "mongodb client created");
        Ok(Self::new(client, database.to_string()))
    }
}

#[async_trait]
impl StoreBackend for MongoBackend {
    fn collection(&self, name: &str) -> Arc<dyn CollectionStore> {
        Arc::new(MongoCollection {
            name: name.to_string(),
            collection: self.client.database(&self.database).collection(name),
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn shutdown(&self) -> StoreResult<()> {
        self.client.clone().shutdown().await;
        tracing::info!("mongodb client shut down");
        Ok(())
    }
}

#[derive(Debug)]
pub struct MongoCollection {
    name: String,
    collection: Collection<bson::Document>,
}

impl MongoCollection {
    fn prepare_document(&self, document: Document) -> StoreResult<bson::Document> {
        match serialize_to_bson(&serde_json::Value::Object(document))? {
            Bson::Document(d) => Ok(d),
            other => Err(StoreError::InvalidDocument {
                collection: self.name.clone(),
                reason: format!("expected document, got {:?}", other.element_type()),
            }),
        }
    }

    fn restore_document(&self, mut document: bson::Document) -> StoreResult<(RecordId, Document)> {
        let id = document
            .get_object_id("_id")
            .map_err(|e| StoreError::InvalidDocument {
                collection: self.name.clone(),
                reason: e.to_string(),
            })?;
        document.remove("_id");
        match deserialize_from_bson::<serde_json::Value>(Bson::Document(document))? {
            serde_json::Value::Object(map) => Ok((RecordId::from(id), map)),
            _ => Err(StoreError::InvalidDocument {
                collection: self.name.clone(),
                reason: "stored value is not a document".into(),
            }),
        }
    }
}

fn backend_err(e: mongodb::error::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl CollectionStore for MongoCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert(&self, document: Document) -> StoreResult<RecordId> {
        let result = self
            .collection
            .insert_one(self.prepare_document(document)?)
            .await
            .map_err(backend_err)?;
        let id = result.inserted_id.as_object_id().ok_or_else(|| StoreError::InvalidDocument {
            collection: self.name.clone(),
            reason: format!("inserted id is not an ObjectId: {}", result.inserted_id),
        })?;
        tracing::debug!(collection = %self.name, id = %id, "insert");
        Ok(RecordId::from(id))
    }

    async fn find_all(&self) -> StoreResult<Vec<(RecordId, Document)>> {
        self.collection
            .find(doc! {})
            .await
            .map_err(backend_err)?
            .try_collect::<Vec<bson::Document>>()
            .await
            .map_err(backend_err)?
            .into_iter()
            .map(|d| self.restore_document(d))
            .collect()
    }

    async fn find_by_id(&self, id: &RecordId) -> StoreResult<Option<Document>> {
        let found = self
            .collection
            .find_one(doc! { "_id": id.object_id() })
            .await
            .map_err(backend_err)?;
        match found {
            Some(d) => Ok(Some(self.restore_document(d)?.1)),
            None => Ok(None),
        }
    }

    async fn replace_by_id(&self, id: &RecordId, document: Document) -> StoreResult<bool> {
        let result = self
            .collection
            .replace_one(doc! { "_id": id.object_id() }, self.prepare_document(document)?)
            .await
            .map_err(backend_err)?;
        tracing::debug!(collection = %self.name, %id, matched = result.matched_count, "replace");
        Ok(result.matched_count > 0)
    }

    async fn delete_by_id(&self, id: &RecordId) -> StoreResult<u64> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.object_id() })
            .await
            .map_err(backend_err)?;
        tracing::debug!(collection = %self.name, %id, deleted = result.deleted_count, "delete");
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::options::ServerAddress;
    use serde_json::json;

    fn collection() -> MongoCollection {
        // Building a Collection handle does not open a connection.
        let options = ClientOptions::builder()
            .hosts(vec![ServerAddress::parse("localhost:27017").unwrap()])
            .build();
        let client = Client::with_options(options).unwrap();
        MongoCollection {
            name: "books".into(),
            collection: client.database("test").collection("books"),
        }
    }

    #[tokio::test]
    async fn documents_convert_to_bson_and_back() {
        let c = collection();
        let fields = json!({"title": "Dune", "published_year": 1965, "filters": {"k": [1, "x"]}})
            .as_object()
            .cloned()
            .unwrap();
        let mut stored = c.prepare_document(fields.clone()).unwrap();
        let oid = bson::oid::ObjectId::new();
        stored.insert("_id", oid);
        let (id, restored) = c.restore_document(stored).unwrap();
        assert_eq!(id, RecordId::from(oid));
        assert_eq!(restored, fields);
    }

    #[tokio::test]
    async fn restore_requires_object_id() {
        let c = collection();
        assert!(c.restore_document(doc! { "title": "Dune" }).is_err());
    }
}
