//! HTTP error type and mappings.
//!
//! Every error leaves the server as a JSON body with a single `error`
//! field, matching the Ollama wire format. The OpenAI-compatible endpoints
//! wrap their errors separately (see [`crate::openai`]).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ggserve_engine::EngineError;
use ggserve_hf::HfError;
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input).
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl HttpError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<EngineError> for HttpError {
    fn from(err: EngineError) -> Self {
        // Engine invocation errors are server-side failures.
        Self::Internal(err.to_string())
    }
}

impl From<HfError> for HttpError {
    fn from(err: HfError) -> Self {
        match err {
            HfError::InvalidReference(_) => Self::BadRequest(err.to_string()),
            HfError::NoGgufFiles | HfError::PatternNotMatched(_) => Self::NotFound(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}
