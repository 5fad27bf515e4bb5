//! Common routes: health, readiness, version, resource index.

use crate::response::{listing, Listing};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<&'static str>,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(State(state): State<AppState>) -> Result<Json<ReadyBody>, (StatusCode, Json<ReadyBody>)> {
    if let Err(e) = state.backend.ping().await {
        tracing::warn!(error = %e, "store ping failed");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                store: Some("unavailable"),
            }),
        ));
    }
    Ok(Json(ReadyBody {
        status: "ok",
        store: Some("ok"),
    }))
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Registered resources with their paths, collections, fields and example payloads.
async fn resources(State(state): State<AppState>) -> Json<Listing<serde_json::Value>> {
    let data: Vec<serde_json::Value> = state
        .api
        .resources()
        .iter()
        .map(|r| {
            serde_json::json!({
                "name": r.name(),
                "path": format!("/{}", r.name()),
                "collection": r.collection(),
                "schema": r.schema().describe(),
            })
        })
        .collect();
    listing(data)
}

/// GET /health, /ready (store ping), /version, /resources.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .route("/resources", get(resources))
        .with_state(state)
}
