//! # REST API Errors
//!
//! Error types for the REST API module.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::query::QueryError;
use crate::store::{EngineError, UnknownResource};

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

/// REST API errors
#[derive(Debug, Clone, Error)]
pub enum RestError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Path names a collection that is not served
    #[error("{0}")]
    UnknownResource(#[from] UnknownResource),

    /// No document with the requested id
    #[error("{label} not found with id of {id}")]
    NotFound { label: &'static str, id: String },

    /// Route exists only for other resources
    #[error("Route not available for {0}")]
    RouteNotFound(String),

    /// Request body is not an acceptable document
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Create request lacks mandatory fields
    #[error("Please add: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Value must be unique across the collection
    #[error("Duplicate field value entered: {0}")]
    Duplicate(String),

    /// Path segment could not be parsed
    #[error("Invalid path parameter: {0}")]
    InvalidPathParam(String),

    /// Query string could not be turned into a collection query
    #[error("{0}")]
    Query(#[from] QueryError),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Collection failure
    #[error("{0}")]
    Engine(#[from] EngineError),
}

impl RestError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            RestError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RestError::MissingFields(_) => StatusCode::BAD_REQUEST,
            RestError::Duplicate(_) => StatusCode::BAD_REQUEST,
            RestError::InvalidPathParam(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            RestError::UnknownResource(_) => StatusCode::NOT_FOUND,
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::RouteNotFound(_) => StatusCode::NOT_FOUND,

            // Depends on whether the caller or the engine is at fault
            RestError::Query(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            RestError::Engine(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            RestError::Query(_) | RestError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: bool,
    pub error: String,
    pub code: u16,
}

impl From<RestError> for ErrorResponse {
    fn from(err: RestError) -> Self {
        Self {
            status: false,
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
