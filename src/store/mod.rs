//! Document store abstraction: one collection per resource kind, keyed by an ObjectId.
//!
//! [`StoreBackend`] is the connection-level handle (acquired at startup, shut down at stop);
//! [`CollectionStore`] is the per-resource handle the generated operations capture.

pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

use async_trait::async_trait;
use bson::oid::ObjectId;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub use memory::InMemoryBackend;
#[cfg(feature = "mongodb")]
pub use mongo::MongoBackend;

/// Field mapping as persisted; the identifier is never part of it.
pub type Document = serde_json::Map<String, serde_json::Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("backend: {0}")]
    Backend(String),
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("invalid document in collection {collection}: {reason}")]
    InvalidDocument { collection: String, reason: String },
    #[error("initialization: {0}")]
    Initialization(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<bson::error::Error> for StoreError {
    fn from(err: bson::error::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Opaque record identifier: a 24-character hex ObjectId.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(ObjectId);

impl RecordId {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Parse a client-supplied id. Anything that is not a valid ObjectId yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        ObjectId::parse_str(s).ok().map(Self)
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for RecordId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

/// One collection of documents. Every method is a single atomic record operation.
#[async_trait]
pub trait CollectionStore: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Insert a new document; the store assigns and returns its identifier.
    async fn insert(&self, document: Document) -> StoreResult<RecordId>;

    /// All documents in store iteration order.
    async fn find_all(&self) -> StoreResult<Vec<(RecordId, Document)>>;

    async fn find_by_id(&self, id: &RecordId) -> StoreResult<Option<Document>>;

    /// Replace the whole document at `id`. Returns false when nothing matched; never inserts.
    async fn replace_by_id(&self, id: &RecordId, document: Document) -> StoreResult<bool>;

    /// Returns the number of documents removed (0 or 1).
    async fn delete_by_id(&self, id: &RecordId) -> StoreResult<u64>;
}

/// Connection-level store handle.
#[async_trait]
pub trait StoreBackend: Send + Sync + fmt::Debug {
    /// Open (or reuse) the collection with the given name.
    fn collection(&self, name: &str) -> Arc<dyn CollectionStore>;

    /// Cheap liveness check used by the readiness route.
    async fn ping(&self) -> StoreResult<()>;

    /// Release connections. Called once after the server stops.
    async fn shutdown(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_round_trips_through_hex() {
        let id = RecordId::new();
        let hex = id.to_string();
        assert_eq!(hex.len(), 24);
        assert_eq!(RecordId::parse(&hex), Some(id));
    }

    #[test]
    fn malformed_ids_do_not_parse() {
        for raw in ["", "abc", "not-an-object-id-at-all!", "zzzzzzzzzzzzzzzzzzzzzzzz", "65a1f0c2e4b0a1b2c3d4e5f"] {
            assert!(RecordId::parse(raw).is_none(), "{raw} should not parse");
        }
    }

    #[test]
    fn record_id_serializes_as_string() {
        let id = RecordId::new();
        assert_eq!(serde_json::to_value(id).unwrap(), serde_json::Value::String(id.to_string()));
    }
}
