//! Model listing endpoints: `GET /api/tags`, `POST /api/show`,
//! `GET /api/ps`.
//!
//! Listing reads the model directory directly — the engine is not involved.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use ggserve_core::Config;
use ggserve_core::api::{
    ListModelResponse, ListResponse, ModelDetails, ProcessResponse, ShowRequest, ShowResponse,
};
use ggserve_core::config::MODEL_EXT;

use crate::error::HttpError;
use crate::handlers::parse_json;
use crate::state::AppState;

/// Capabilities advertised for every servable model.
const CAPABILITY_THINKING: &str = "thinking";

/// Build the model list from the model directory, most recently modified
/// first.
pub(crate) fn build_list(config: &Config) -> ListResponse {
    let mut models: Vec<ListModelResponse> = config
        .model_file_infos()
        .into_iter()
        .map(|info| ListModelResponse {
            name: info.name.clone(),
            model: info.name,
            size: info.size,
            modified_at: info.modified_at,
            details: ModelDetails {
                format: MODEL_EXT[1..].to_string(),
                ..ModelDetails::default()
            },
        })
        .collect();

    models.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
    ListResponse { models }
}

/// Look up one model by name.
pub(crate) fn find_model(config: &Config, name: &str) -> Option<ShowResponse> {
    config
        .model_file_infos()
        .into_iter()
        .find(|info| info.name == name)
        .map(|info| ShowResponse {
            modelfile: info.name,
            details: ModelDetails {
                format: MODEL_EXT[1..].to_string(),
                ..ModelDetails::default()
            },
            modified_at: info.modified_at,
            capabilities: vec![CAPABILITY_THINKING.to_string()],
        })
}

/// Handle `GET /api/tags` and `GET /api/models`.
pub async fn list(State(state): State<AppState>) -> Json<ListResponse> {
    Json(build_list(&state.config))
}

/// Handle `POST /api/show`. Falls back to the configured model when the
/// request names none.
pub async fn show(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ShowResponse>, HttpError> {
    let req: ShowRequest = parse_json(&body)?;
    let name = if req.model.is_empty() {
        state.config.model.clone()
    } else {
        req.model
    };

    find_model(&state.config, &name)
        .map(Json)
        .ok_or_else(|| HttpError::NotFound(format!("model '{name}' not found")))
}

/// Handle `GET /api/ps`. Keep-alive expiry is not tracked, so the running
/// set is always empty.
pub async fn ps() -> Json<ProcessResponse> {
    Json(ProcessResponse::default())
}
