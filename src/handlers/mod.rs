// Handlers module
// HTTP handlers for the REST API

pub mod users;

/// Body returned by the health check route.
pub const HEALTH_MESSAGE: &str = "✅ Server is running!";

/// Health check handler
/// GET /
/// Plain text, never touches the database
pub async fn home() -> &'static str {
    HEALTH_MESSAGE
}
