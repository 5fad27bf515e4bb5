//! Load resource catalogs from JSON text or files.

use crate::config::{validate, ResourceConfig};
use crate::error::ConfigError;
use std::path::Path;

/// Parse and validate a JSON array of resource definitions.
pub fn parse_resources(json: &str) -> Result<Vec<ResourceConfig>, ConfigError> {
    let resources: Vec<ResourceConfig> =
        serde_json::from_str(json).map_err(|e| ConfigError::Load(format!("resource catalog: {}", e)))?;
    validate(&resources)?;
    Ok(resources)
}

pub async fn load_from_path(path: impl AsRef<Path>) -> Result<Vec<ResourceConfig>, ConfigError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    tracing::info!(path = %path.display(), "loading resource catalog");
    parse_resources(&text)
}
