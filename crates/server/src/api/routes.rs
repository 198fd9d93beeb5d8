use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{handlers, middleware::metrics_middleware, providers, searches};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Providers
        .route("/providers", get(providers::list_providers))
        // Searches
        .route("/searches", post(searches::create_search))
        .route("/searches", get(searches::list_searches))
        .route("/searches/{id}", get(searches::get_search))
        .route("/searches/{id}/offers", get(searches::list_offers))
        .with_state(Arc::clone(&state));

    // Prometheus scrape endpoint, outside the versioned API
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(metrics_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
