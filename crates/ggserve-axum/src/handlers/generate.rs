//! Generate endpoint: `POST /api/generate` (also `POST /v1/completions`).

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use ggserve_core::api::{GenerateRequest, GenerateResponse, KeepAlive, wants_stream};
use ggserve_core::template::{generate_messages, render_chat_prompt};

use crate::error::HttpError;
use crate::handlers::{accept_header, parse_json};
use crate::state::AppState;
use crate::stream;

/// Handle a generate request.
///
/// An empty prompt is a model-lifecycle probe, not a generation: combined
/// with `keep_alive: 0` it asks for an unload, alone it asks for a load.
/// Neither issues an engine call.
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpError> {
    let req: GenerateRequest = parse_json(&body)?;

    if req.prompt.is_empty() {
        let reason = if req.keep_alive.as_ref().is_some_and(KeepAlive::is_zero) {
            "unload"
        } else {
            "load"
        };
        return Ok(Json(probe_response(&req.model, reason)).into_response());
    }

    let prompt = if req.raw {
        req.prompt.clone()
    } else {
        render_chat_prompt(&generate_messages(req.system.as_deref(), &req.prompt))
    };

    let streaming = wants_stream(req.stream);
    let payload = engine_payload(&prompt, streaming, &req);

    let (id, receiver) = state
        .registry
        .open()
        .ok_or_else(|| HttpError::Internal("correlation id allocation failed".to_string()))?;

    let task_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(err) = task_state.runner.generate(id, payload).await {
            tracing::warn!(%id, error = %err, "generate call failed");
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

/// Terminal response for the load/unload probes.
fn probe_response(model: &str, reason: &str) -> GenerateResponse {
    GenerateResponse {
        model: model.to_string(),
        created_at: Utc::now(),
        response: String::new(),
        done: true,
        done_reason: Some(reason.to_string()),
    }
}

/// Build the engine request: the options bag passed through untouched, with
/// the rendered prompt and stream flag layered on top.
fn engine_payload(prompt: &str, streaming: bool, req: &GenerateRequest) -> String {
    let mut payload = serde_json::Map::new();
    for (key, value) in &req.options {
        payload.insert(key.clone(), value.clone());
    }
    payload.insert("prompt".to_string(), serde_json::json!(prompt));
    payload.insert("stream".to_string(), serde_json::json!(streaming));
    serde_json::Value::Object(payload).to_string()
}
