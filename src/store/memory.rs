//! In-memory backend: documents kept per collection in insertion order behind async read-write locks.

use crate::store::{CollectionStore, Document, RecordId, StoreBackend, StoreResult};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Process-local store. Clones share the same collections.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBackend {
    collections: Arc<RwLock<HashMap<String, Arc<InMemoryCollection>>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreBackend for InMemoryBackend {
    fn collection(&self, name: &str) -> Arc<dyn CollectionStore> {
        if let Some(c) = self
            .collections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
        {
            return c.clone();
        }
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemoryCollection::new(name)))
            .clone()
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn shutdown(&self) -> StoreResult<()> {
        tracing::debug!("in-memory store released");
        Ok(())
    }
}

#[derive(Debug)]
pub struct InMemoryCollection {
    name: String,
    documents: tokio::sync::RwLock<IndexMap<RecordId, Document>>,
}

impl InMemoryCollection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            documents: tokio::sync::RwLock::new(IndexMap::new()),
        }
    }
}

#[async_trait]
impl CollectionStore for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert(&self, document: Document) -> StoreResult<RecordId> {
        let id = RecordId::new();
        self.documents.write().await.insert(id, document);
        tracing::debug!(collection = %self.name, %id, "insert");
        Ok(id)
    }

    async fn find_all(&self) -> StoreResult<Vec<(RecordId, Document)>> {
        let docs = self.documents.read().await;
        Ok(docs.iter().map(|(id, d)| (*id, d.clone())).collect())
    }

    async fn find_by_id(&self, id: &RecordId) -> StoreResult<Option<Document>> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn replace_by_id(&self, id: &RecordId, document: Document) -> StoreResult<bool> {
        let mut docs = self.documents.write().await;
        match docs.get_mut(id) {
            Some(slot) => {
                *slot = document;
                tracing::debug!(collection = %self.name, %id, "replace");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: &RecordId) -> StoreResult<u64> {
        let removed = self.documents.write().await.shift_remove(id).is_some();
        tracing::debug!(collection = %self.name, %id, removed, "delete");
        Ok(removed as u64)
    }
}
