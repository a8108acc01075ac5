//! Liveness, version, and engine introspection endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::Response;
use serde::Serialize;

use crate::error::HttpError;
use crate::state::AppState;

/// Version response body.
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
}

/// Handle `GET /health`.
pub async fn health() -> &'static str {
    "ggserve is running"
}

/// Handle `GET /api/version`.
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle `GET /props` and `GET /api/props`: engine properties, passed
/// through as the engine's own JSON.
pub async fn props(State(state): State<AppState>) -> Result<Response, HttpError> {
    let json = state.runner.props().await?;
    raw_json(json)
}

/// Handle `POST /props`.
///
/// Changing global properties is gated behind configuration; without it the
/// endpoint reports itself unsupported.
pub async fn props_change(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, HttpError> {
    if !state.config.props_endpoint {
        return Err(HttpError::Internal(
            "This server does not support changing global properties. Start it with `--props`"
                .to_string(),
        ));
    }
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Handle `GET /slots`: active slot state, passed through as the engine's
/// own JSON.
pub async fn slots(State(state): State<AppState>) -> Result<Response, HttpError> {
    let json = state.runner.slots().await?;
    raw_json(json)
}

fn raw_json(json: String) -> Result<Response, HttpError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(json.into())
        .map_err(|err| HttpError::Internal(err.to_string()))
}
