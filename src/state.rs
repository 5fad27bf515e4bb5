//! Shared application state for the service routes. Resource routes carry their own operations instead.

use crate::registry::GeneratedApi;
use crate::store::StoreBackend;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn StoreBackend>,
    /// Fixed after startup; resources are never added while serving.
    pub api: Arc<GeneratedApi>,
}
