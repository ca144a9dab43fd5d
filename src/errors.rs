use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by [`crate::store::KeyValueStore`] and the HTTP boundary.
///
/// `NoSuchKey` is an expected outcome, not a fault, and callers must be able
/// to tell it apart from everything else.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("no such key")]
    NoSuchKey,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal store error")]
    Internal,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            StoreError::NoSuchKey => (StatusCode::NOT_FOUND, self.to_string()),
            StoreError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            StoreError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
