//! Embedding endpoints: `POST /api/embed` and the legacy
//! `POST /api/embeddings`.

use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use ggserve_core::api::{EmbedRequest, EmbedResponse, EmbeddingRequest, EmbeddingResponse};

use crate::error::HttpError;
use crate::handlers::parse_json;
use crate::state::AppState;

/// Normalize the `input` field: a single string or a list of strings.
///
/// An empty string input yields an empty list; any non-string list element
/// is an invalid input type.
pub(crate) fn normalize_input(input: &serde_json::Value) -> Result<Vec<String>, HttpError> {
    match input {
        serde_json::Value::String(s) => {
            if s.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(vec![s.clone()])
            }
        }
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(ToString::to_string)
                    .ok_or_else(|| HttpError::BadRequest("invalid input type".to_string()))
            })
            .collect(),
        serde_json::Value::Null => Ok(Vec::new()),
        _ => Err(HttpError::BadRequest("invalid input type".to_string())),
    }
}

/// Run one embedding call for the given inputs.
///
/// The inputs are joined with the configured separator into a single engine
/// call and the resulting vectors split back out; the engine must return
/// exactly one vector per input.
pub(crate) async fn run_embed(
    state: &AppState,
    model: String,
    inputs: Vec<String>,
) -> Result<EmbedResponse, HttpError> {
    let started = Instant::now();

    if inputs.is_empty() {
        return Ok(EmbedResponse {
            model,
            embeddings: Vec::new(),
            ..EmbedResponse::default()
        });
    }

    let loaded = Instant::now();
    let prompts = inputs.join(&state.config.embd_separator);

    let raw = state
        .runner
        .embedding(prompts)
        .await
        .map_err(|err| HttpError::Internal(err.to_string().trim().to_string()))?;

    let embeddings: Vec<Vec<f32>> = serde_json::from_str(&raw)
        .map_err(|err| HttpError::Internal(err.to_string().trim().to_string()))?;

    if embeddings.len() != inputs.len() {
        return Err(HttpError::Internal(format!(
            "embedding count mismatch: {} != {}",
            embeddings.len(),
            inputs.len()
        )));
    }

    Ok(EmbedResponse {
        model,
        embeddings,
        total_duration: Some(elapsed_nanos(started)),
        load_duration: Some(nanos_between(started, loaded)),
        prompt_eval_count: Some(inputs.len()),
    })
}

/// Handle `POST /api/embed`.
pub async fn embed(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<EmbedResponse>, HttpError> {
    let req: EmbedRequest = parse_json(&body)?;
    let inputs = normalize_input(&req.input)?;
    let response = run_embed(&state, req.model, inputs).await?;
    Ok(Json(response))
}

/// Handle the legacy `POST /api/embeddings`.
///
/// An empty prompt just loads the model and returns an empty embedding.
pub async fn embeddings(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<EmbeddingResponse>, HttpError> {
    let req: EmbeddingRequest = parse_json(&body)?;

    if req.prompt.is_empty() {
        return Ok(Json(EmbeddingResponse::default()));
    }

    let raw = state
        .runner
        .embedding(req.prompt)
        .await
        .map_err(|err| HttpError::Internal(err.to_string().trim().to_string()))?;

    let embeddings: Vec<Vec<f64>> = serde_json::from_str(&raw)
        .map_err(|err| HttpError::Internal(err.to_string().trim().to_string()))?;

    let embedding = embeddings
        .into_iter()
        .next()
        .ok_or_else(|| HttpError::Internal("no embedding returned".to_string()))?;

    Ok(Json(EmbeddingResponse { embedding }))
}

fn elapsed_nanos(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_nanos()).unwrap_or(u64::MAX)
}

fn nanos_between(start: Instant, end: Instant) -> u64 {
    u64::try_from(end.duration_since(start).as_nanos()).unwrap_or(u64::MAX)
}
