//! Graph server: books, users, datasets, sessions, graphs and data filters over MongoDB.
//!
//! Run from repo root: `cargo run -p graph_server`
//! Settings come from the environment or `.env` (see `resource_sdk::ServerConfig`).

use resource_sdk::{
    app, load_from_path, parse_resources, AppState, InMemoryBackend, MongoBackend, ResourceConfig,
    ResourceRegistry, ServerConfig, StoreBackend, StoreKind,
};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Catalog used when `RESOURCES_PATH` is unset.
const BUILTIN_RESOURCES: &str = include_str!("../resources.json");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("resource_sdk=info,graph_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let resources = load_resources(&config).await?;

    let backend: Arc<dyn StoreBackend> = match config.store {
        StoreKind::MongoDb => Arc::new(MongoBackend::connect(&config.mongodb_uri, &config.database_name).await?),
        StoreKind::Memory => {
            tracing::warn!("using in-memory store; records are lost on exit");
            Arc::new(InMemoryBackend::new())
        }
    };

    let api = ResourceRegistry::from_config(&resources, backend.as_ref())?.generate();
    let state = AppState {
        backend: backend.clone(),
        api: Arc::new(api),
    };

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    serve(listener, app(state, config.body_limit_bytes), backend.as_ref(), shutdown_signal()).await?;
    tracing::info!("stopped");
    Ok(())
}

/// Serve until `signal` resolves, then release the store whether or not serving failed.
async fn serve<F>(
    listener: TcpListener,
    router: Router,
    backend: &dyn StoreBackend,
    signal: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let served = axum::serve(listener, router).with_graceful_shutdown(signal).await;
    if let Err(e) = &served {
        tracing::error!(error = %e, "server stopped with an error");
    }
    let closed = backend.shutdown().await;
    served?;
    closed?;
    Ok(())
}

async fn load_resources(config: &ServerConfig) -> Result<Vec<ResourceConfig>, resource_sdk::ConfigError> {
    match &config.resources_path {
        Some(path) => load_from_path(path).await,
        None => parse_resources(BUILTIN_RESOURCES),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
