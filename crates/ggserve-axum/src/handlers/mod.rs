//! Route handlers, one module per endpoint family.

pub mod chat;
pub mod embed;
pub mod generate;
pub mod models;
pub mod pull;
pub mod system;

use axum::body::Bytes;
use axum::http::{HeaderMap, header};
use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// Parse a JSON request body.
///
/// A missing body is a 400 "missing request body"; malformed JSON is a 400
/// carrying the parse error.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, HttpError> {
    if body.is_empty() {
        return Err(HttpError::BadRequest("missing request body".to_string()));
    }
    serde_json::from_slice(body).map_err(|err| HttpError::BadRequest(err.to_string()))
}

/// The request's `Accept` header value, if any.
pub(crate) fn accept_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::ACCEPT).and_then(|v| v.to_str().ok())
}
