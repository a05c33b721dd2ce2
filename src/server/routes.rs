//! Router configuration for the web server.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
///
/// Layer endpoints live under `path_prefix` (already normalized to `""` or
/// `/segment`); the health check is always served at the root.
pub fn create_router(state: AppState, path_prefix: &str) -> Router {
    let layers = Router::new()
        .route("/buildings", get(handlers::buildings))
        .route("/zoning", get(handlers::zoning))
        .route("/parcels", get(handlers::parcels));

    let router = Router::new()
        // Health check for container orchestration
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health));

    let router = if path_prefix.is_empty() {
        router.merge(layers)
    } else {
        router.nest(path_prefix, layers)
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
