use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState, websocket::websocket_handler};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Projection endpoints
        .route("/api/projections", post(handlers::enhance_projections))
        // Slate endpoints
        .route("/api/slate", post(handlers::load_slate))
        .route("/api/slate", delete(handlers::clear_slate))
        // Admin endpoints
        .route("/api/admin/usage", get(handlers::get_current_usage))
        .route("/api/admin/usage/history", get(handlers::get_usage_history))
        // System endpoints
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        // WebSocket endpoint
        .route("/ws", get(websocket_handler))
        // Add state and CORS
        .with_state(state)
        .layer(cors)
}
