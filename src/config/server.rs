//! Process settings read from the environment (`.env` is loaded by the binary first).

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017/";
pub const DEFAULT_DATABASE_NAME: &str = "my_database";
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    MongoDb,
    Memory,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreKind::MongoDb),
            "memory" | "in-memory" => Ok(StoreKind::Memory),
            other => Err(ConfigError::Load(format!(
                "invalid STORE_BACKEND: {} (expected mongodb or memory)",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreKind,
    pub mongodb_uri: String,
    pub database_name: String,
    /// Catalog file; the built-in catalog is used when unset.
    pub resources_path: Option<PathBuf>,
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Load(format!("invalid BIND_ADDR {}: {}", bind, e)))?;
        let store = match lookup("STORE_BACKEND") {
            Some(s) => s.parse::<StoreKind>()?,
            None => StoreKind::MongoDb,
        };
        let body_limit_bytes = match lookup("BODY_LIMIT_BYTES") {
            Some(s) => s
                .parse::<usize>()
                .map_err(|e| ConfigError::Load(format!("invalid BODY_LIMIT_BYTES {}: {}", s, e)))?,
            None => DEFAULT_BODY_LIMIT_BYTES,
        };
        Ok(Self {
            bind_addr,
            store,
            mongodb_uri: lookup("MONGODB_URI").unwrap_or_else(|| DEFAULT_MONGODB_URI.into()),
            database_name: lookup("DATABASE_NAME").unwrap_or_else(|| DEFAULT_DATABASE_NAME.into()),
            resources_path: lookup("RESOURCES_PATH").filter(|s| !s.is_empty()).map(PathBuf::from),
            body_limit_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ServerConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply() {
        let c = config(&[]).unwrap();
        assert_eq!(c.bind_addr.port(), 8000);
        assert_eq!(c.store, StoreKind::MongoDb);
        assert_eq!(c.mongodb_uri, DEFAULT_MONGODB_URI);
        assert_eq!(c.database_name, "my_database");
        assert!(c.resources_path.is_none());
        assert_eq!(c.body_limit_bytes, DEFAULT_BODY_LIMIT_BYTES);
    }

    #[test]
    fn overrides_are_parsed() {
        let c = config(&[
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("STORE_BACKEND", "Memory"),
            ("RESOURCES_PATH", "/etc/resources.json"),
            ("BODY_LIMIT_BYTES", "4096"),
        ])
        .unwrap();
        assert_eq!(c.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(c.store, StoreKind::Memory);
        assert_eq!(c.resources_path, Some(PathBuf::from("/etc/resources.json")));
        assert_eq!(c.body_limit_bytes, 4096);
    }

    #[test]
    fn invalid_values_are_load_errors() {
        assert!(matches!(config(&[("BIND_ADDR", "nowhere")]), Err(ConfigError::Load(_))));
        assert!(matches!(config(&[("STORE_BACKEND", "postgres")]), Err(ConfigError::Load(_))));
        assert!(matches!(config(&[("BODY_LIMIT_BYTES", "-1")]), Err(ConfigError::Load(_))));
    }
}
