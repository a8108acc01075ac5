//! Chat endpoint: `POST /api/chat` (also `POST /v1/chat/completions`).

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use ggserve_core::api::{ChatRequest, wants_stream};

use crate::error::HttpError;
use crate::handlers::{accept_header, parse_json};
use crate::state::AppState;
use crate::stream;

/// Handle a chat request.
///
/// The raw body is forwarded to the engine verbatim; parsing here is for
/// validation and the stream flag only.
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpError> {
    let req: ChatRequest = parse_json(&body)?;

    if req.messages.is_empty() {
        return Err(HttpError::BadRequest("no messages provided".to_string()));
    }

    let payload = String::from_utf8_lossy(&body).into_owned();
    let streaming = wants_stream(req.stream);

    let (id, receiver) = state
        .registry
        .open()
        .ok_or_else(|| HttpError::Internal("correlation id allocation failed".to_string()))?;

    let task_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(err) = task_state.runner.chat(id, payload).await {
            tracing::warn!(%id, error = %err, "chat call failed");
        }
    });

    if !streaming {
        let content = stream::collect(receiver).await;
        if content.is_empty() {
            return Err(HttpError::Internal("no content".to_string()));
        }
        let value: serde_json::Value = serde_json::from_str(&content)
            .map_err(|_| HttpError::Internal("invalid json".to_string()))?;
        return Ok(Json(value).into_response());
    }

    Ok(stream::stream_response(receiver, accept_header(&headers)))
}
