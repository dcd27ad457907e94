//! Error types for mlib-api
//!
//! Every request-scoped failure ends here and becomes an HTTP status plus a
//! `{"error": "..."}` body. Nothing propagates past the handler boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::services::EnrichmentError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Song metadata lookup failed; creation is aborted (500)
    #[error("Failed to fetch song details: {0}")]
    Enrichment(#[from] EnrichmentError),

    /// mlib-common error other than not-found / invalid input (500)
    #[error("{0}")]
    Common(mlib_common::Error),
}

impl From<mlib_common::Error> for ApiError {
    fn from(err: mlib_common::Error) -> Self {
        match err {
            mlib_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            mlib_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Common(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Enrichment(_) | ApiError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", message);
        } else {
            debug!(status = status.as_u16(), "{}", message);
        }

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
