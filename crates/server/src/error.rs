//! HTTP error responses.
//!
//! Every failure becomes `{"error": "<message>"}` with a status derived from
//! the core error. Server-side failures are logged in full and answered with
//! a short message.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use grantbridge_core::Error;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),

    /// Body was not JSON, or not the expected shape.
    #[error("INVALID_INPUT: malformed request body: {0}")]
    MalformedBody(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(err) => match err {
                Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                Error::SyncInProgress => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::MalformedBody(msg) => format!("Invalid request body: {msg}"),
            ApiError::Core(err) => match err {
                Error::InvalidInput(msg) | Error::Unauthorized(msg) => msg.clone(),
                Error::SyncInProgress => "A grant sync is already running".to_string(),
                Error::Upstream(_) => "Failed to fetch grants".to_string(),
                Error::Parse(_) => "Failed to parse grant data".to_string(),
                Error::Persistence(_) | Error::Database(_) | Error::MigrationFailed(_) => {
                    "Failed to access grant storage".to_string()
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
