//! Dispatcher: service routes plus every generated resource router, behind tracing and a body limit.

mod common;

pub use common::common_routes;

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

async fn fallback() -> AppError {
    AppError::NotFound("no such route".into())
}

/// Full application router. Paths are unprefixed: `/books`, `/books/:id`, ...
pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    let resources = state.api.router();
    Router::new()
        .merge(common_routes(state))
        .merge(resources)
        .fallback(fallback)
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(body_limit_bytes)),
        )
}
