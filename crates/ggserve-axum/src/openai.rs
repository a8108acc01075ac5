//! OpenAI compatibility shims.
//!
//! The `/v1` endpoints reuse the native operations and re-shape their typed
//! output through pure mapping functions — the native handlers never know
//! they are being shimmed. Errors on these endpoints always use the OpenAI
//! `{error: {message, type, param, code}}` envelope.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ggserve_core::api::{EmbedResponse, ListResponse, ShowResponse};
use ggserve_hf::ModelRef;
use serde::{Deserialize, Serialize};

use crate::error::HttpError;
use crate::handlers::embed::{normalize_input, run_embed};
use crate::handlers::models::{build_list, find_model};
use crate::handlers::parse_json;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

/// OpenAI error payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct Error {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub param: Option<serde_json::Value>,
    pub code: Option<String>,
}

/// OpenAI error envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: Error,
}

/// One model entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

/// `GET /v1/models` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListCompletion {
    pub object: String,
    pub data: Vec<Model>,
}

/// One embedding entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Embedding {
    pub object: String,
    pub embedding: Vec<f32>,
    pub index: usize,
}

/// Token usage accounting.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    pub prompt_tokens: usize,
    pub total_tokens: usize,
}

/// `POST /v1/embeddings` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct EmbeddingList {
    pub object: String,
    pub data: Vec<Embedding>,
    pub model: String,
    pub usage: EmbeddingUsage,
}

/// `POST /v1/embeddings` request.
#[derive(Debug, Default, Deserialize)]
pub struct EmbedRequest {
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub dimensions: Option<usize>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Error envelope
// ─────────────────────────────────────────────────────────────────────────────

/// Build an OpenAI error envelope; the type string derives from the status.
pub fn new_error(status: StatusCode, message: String) -> ErrorResponse {
    let error_type = match status {
        StatusCode::BAD_REQUEST => "invalid_request_error",
        StatusCode::NOT_FOUND => "not_found_error",
        _ => "api_error",
    };
    ErrorResponse {
        error: Error {
            message,
            error_type: error_type.to_string(),
            param: None,
            code: None,
        },
    }
}

/// [`HttpError`] rendered with the OpenAI envelope instead of the native one.
#[derive(Debug)]
pub struct OpenAiError(pub HttpError);

impl IntoResponse for OpenAiError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        (status, Json(new_error(status, self.0.to_string()))).into_response()
    }
}

impl From<HttpError> for OpenAiError {
    fn from(err: HttpError) -> Self {
        Self(err)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shims: native schema → OpenAI schema
// ─────────────────────────────────────────────────────────────────────────────

/// Map the native model list into the OpenAI list object. `owned_by` comes
/// from the namespace of the model name parsed as a registry reference;
/// unparseable names are skipped.
pub fn to_model_list(list: ListResponse) -> ListCompletion {
    let data = list
        .models
        .into_iter()
        .filter_map(|m| match m.name.parse::<ModelRef>() {
            Ok(reference) => Some(Model {
                id: m.name,
                object: "model".to_string(),
                created: m.modified_at.timestamp(),
                owned_by: reference.namespace,
            }),
            Err(err) => {
                tracing::error!(model = %m.name, error = %err, "skipping unparseable model name");
                None
            }
        })
        .collect();

    ListCompletion {
        object: "list".to_string(),
        data,
    }
}

/// Map one native show response into an OpenAI model object.
pub fn to_model(show: &ShowResponse, name: &str) -> Model {
    let owned_by = name
        .parse::<ModelRef>()
        .map_or_else(|_| name.to_string(), |reference| reference.namespace);
    Model {
        id: name.to_string(),
        object: "model".to_string(),
        created: show.modified_at.timestamp(),
        owned_by,
    }
}

/// Map the native embed response into an OpenAI embedding list.
pub fn to_embedding_list(model: &str, response: EmbedResponse) -> EmbeddingList {
    let count = response.prompt_eval_count.unwrap_or_default();
    let data = response
        .embeddings
        .into_iter()
        .enumerate()
        .map(|(index, embedding)| Embedding {
            object: "embedding".to_string(),
            embedding,
            index,
        })
        .collect();

    EmbeddingList {
        object: "list".to_string(),
        data,
        model: model.to_string(),
        usage: EmbeddingUsage {
            prompt_tokens: count,
            total_tokens: count,
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Handle `GET /v1/models`.
pub async fn list_models(State(state): State<AppState>) -> Json<ListCompletion> {
    Json(to_model_list(build_list(&state.config)))
}

/// Handle `GET /v1/models/{model}`.
pub async fn retrieve_model(
    State(state): State<AppState>,
    Path(model): Path<String>,
) -> Result<Json<Model>, OpenAiError> {
    let show = find_model(&state.config, &model)
        .ok_or_else(|| HttpError::NotFound(format!("model '{model}' not found")))?;
    Ok(Json(to_model(&show, &model)))
}

/// Handle `POST /v1/embeddings`.
pub async fn embeddings(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<EmbeddingList>, OpenAiError> {
    let req: EmbedRequest = parse_json(&body)?;

    // An empty string still embeds; an absent or empty input is invalid.
    let input = if req.input == serde_json::json!("") {
        serde_json::json!([""])
    } else {
        req.input
    };
    if input.is_null() || input.as_array().is_some_and(Vec::is_empty) {
        return Err(HttpError::BadRequest("invalid input".to_string()).into());
    }

    let inputs = normalize_input(&input)?;
    let response = run_embed(&state, req.model.clone(), inputs).await?;
    Ok(Json(to_embedding_list(&req.model, response)))
}
