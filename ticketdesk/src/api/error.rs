//! HTTP error responses.
//!
//! Every failed request answers with a JSON body of the form
//! `{"error": <short title>, "message": <detail>}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use crate::catalog::CatalogError;

/// Error returned by catalog handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    /// Short title, e.g. `"Invalid limit"`
    error: String,
    /// Human-readable detail
    message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
        }
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error, message)
    }

    /// Create a 500 Internal Server Error carrying `message` to the client.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status.as_u16(), self.error, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidParameter { error, message, .. } => Self::bad_request(error, message),
            CatalogError::QueryFailed(message) => Self::internal(message),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                error = %self.error,
                detail = %self.message,
                "Internal server error"
            );
        } else {
            tracing::warn!(
                status = %self.status,
                error = %self.error,
                detail = %self.message,
                "Rejected request"
            );
        }

        let body = ErrorResponse {
            error: self.error,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}
