use axum::{routing::get, Router};

use crate::{
    db::SharedSource,
    handlers::{home, users::list_users},
    middleware::create_middleware_stack,
};

/// Create the Axum router with all endpoints and middleware
pub fn create_router(source: SharedSource) -> Router {
    Router::new()
        // Health check endpoint
        .route("/", get(home))
        // User locations endpoint
        .route("/users", get(list_users))
        // Add shared state (location source)
        .with_state(source)
        // Apply middleware stack
        .layer(create_middleware_stack())
}
