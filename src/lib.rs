//! Resource SDK: schema-driven REST resources over a document store.
//!
//! Declare a [`RecordSchema`] per resource kind, bind it to a collection in a
//! [`ResourceRegistry`], then [`ResourceRegistry::generate`] the uniform
//! create/list/get/update/delete operations and mount [`routes::app`].

pub mod config;
pub mod error;
pub mod extractors;
pub mod generator;
pub mod registry;
pub mod response;
pub mod routes;
pub mod schema;
pub mod state;
pub mod store;

pub use config::{load_from_path, parse_resources, ResourceConfig, ServerConfig, StoreKind};
pub use error::{AppError, ConfigError};
pub use generator::ResourceOperations;
pub use registry::{GeneratedApi, ResourceRegistry};
pub use extractors::JsonBody;
pub use response::{created, listing, ok, Message};
pub use routes::{app, common_routes};
pub use schema::{FieldType, Record, RecordSchema, ValidationError};
pub use state::AppState;
pub use store::{CollectionStore, InMemoryBackend, RecordId, StoreBackend, StoreError, StoreResult};
#[cfg(feature = "mongodb")]
pub use store::MongoBackend;
