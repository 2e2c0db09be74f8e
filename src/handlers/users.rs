// User location handlers

use axum::extract::State;
use tracing::{error, info};

use crate::{db::SharedSource, models::Envelope};

/// List every row of `user_locations`
/// GET /users
///
/// Faults are reported inside the envelope; the response is always HTTP 200.
pub async fn list_users(State(source): State<SharedSource>) -> Envelope {
    info!("Fetching all user locations");

    match source.fetch_user_locations().await {
        Ok(rows) => {
            info!("Retrieved {} user locations", rows.len());
            Envelope::success(rows)
        }
        Err(err) => {
            let message = err.fault_message();
            error!("Failed to fetch user locations: {}", message);
            Envelope::error(message)
        }
    }
}
