// Library root for the user locations API

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;

// Re-export commonly used types
pub use db::{Database, LocationSource, SharedSource};
pub use error::DataAccessError;
pub use models::{Envelope, Row};
pub use router::create_router;
