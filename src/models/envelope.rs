use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::row::Row;

/// Response body for `/users`.
///
/// Serialized with `status` as the discriminant:
/// `{"status":"success","data":[...]}` or `{"status":"error","message":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    Success { data: Vec<Row> },
    Error { message: String },
}

impl Envelope {
    pub fn success(data: Vec<Row>) -> Self {
        Self::Success { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

impl IntoResponse for Envelope {
    // Failures are signalled through `status` in the body; the HTTP status is always 200.
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
