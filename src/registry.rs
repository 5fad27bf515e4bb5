//! Resource registry: name → (schema, store) bindings made at startup, turned into routable operations once.

use crate::config::{validate, validate_resource_name, ResourceConfig};
use crate::error::ConfigError;
use crate::generator::ResourceOperations;
use crate::schema::RecordSchema;
use crate::store::{CollectionStore, StoreBackend};
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;

struct ResourceBinding {
    name: String,
    schema: Arc<RecordSchema>,
    store: Arc<dyn CollectionStore>,
}

#[derive(Default)]
pub struct ResourceRegistry {
    bindings: Vec<ResourceBinding>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every resource of a catalog, opening one collection per resource on `backend`.
    pub fn from_config(resources: &[ResourceConfig], backend: &dyn StoreBackend) -> Result<Self, ConfigError> {
        validate(resources)?;
        let mut registry = Self::new();
        for r in resources {
            let schema = r.to_schema()?;
            registry.register(&r.name, schema, backend.collection(r.collection_name()))?;
        }
        Ok(registry)
    }

    pub fn register(
        &mut self,
        name: &str,
        schema: RecordSchema,
        store: Arc<dyn CollectionStore>,
    ) -> Result<(), ConfigError> {
        validate_resource_name(name)?;
        if self.bindings.iter().any(|b| b.name == name) {
            return Err(ConfigError::DuplicateResource(name.to_string()));
        }
        if let Some(owner) = self.bindings.iter().find(|b| b.store.name() == store.name()) {
            return Err(ConfigError::DuplicateCollection {
                collection: store.name().to_string(),
                first: owner.name.clone(),
                second: name.to_string(),
            });
        }
        tracing::info!(resource = %name, schema = %schema.name(), collection = %store.name(), "registered resource");
        self.bindings.push(ResourceBinding {
            name: name.to_string(),
            schema: Arc::new(schema),
            store,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Build the operation set for every binding. The registry is consumed; bindings cannot change afterwards.
    pub fn generate(self) -> GeneratedApi {
        let resources: Vec<Arc<ResourceOperations>> = self
            .bindings
            .into_iter()
            .map(|b| Arc::new(ResourceOperations::new(b.name, b.schema, b.store)))
            .collect();
        let by_name = resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name().to_string(), i))
            .collect();
        GeneratedApi { resources, by_name }
    }
}

/// Every generated resource, in registration order.
#[derive(Debug)]
pub struct GeneratedApi {
    resources: Vec<Arc<ResourceOperations>>,
    by_name: HashMap<String, usize>,
}

impl GeneratedApi {
    pub fn resource(&self, name: &str) -> Option<&Arc<ResourceOperations>> {
        self.by_name.get(name).map(|&i| &self.resources[i])
    }

    pub fn resources(&self) -> &[Arc<ResourceOperations>] {
        &self.resources
    }

    /// One router with the routes of every resource merged in.
    pub fn router(&self) -> Router {
        self.resources
            .iter()
            .fold(Router::new(), |router, r| router.merge(r.clone().router()))
    }
}
