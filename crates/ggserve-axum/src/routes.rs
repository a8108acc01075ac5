//! Route definitions and router construction.

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{chat, embed, generate, models, pull, system};
use crate::openai;
use crate::state::AppState;

/// Build the CORS layer from the configured origin list. Entries that do
/// not parse as header values are dropped.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the main router with the Ollama-compatible surface and the
/// OpenAI `/v1` aliases.
///
/// `get` routes also answer HEAD requests with the body stripped.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.allowed_origins());

    Router::new()
        // General
        .route("/health", get(system::health))
        .route("/api/version", get(system::version))
        // Models
        .route("/api/pull", post(pull::pull))
        .route("/api/tags", get(models::list))
        .route("/api/models", get(models::list))
        .route("/api/show", post(models::show))
        .route("/api/ps", get(models::ps))
        // Engine introspection
        .route("/api/props", get(system::props))
        .route("/props", get(system::props).post(system::props_change))
        .route("/slots", get(system::slots))
        // Inference
        .route("/api/generate", post(generate::generate))
        .route("/api/chat", post(chat::chat))
        .route("/api/embed", post(embed::embed))
        .route("/api/embeddings", post(embed::embeddings))
        // Inference (OpenAI compatibility)
        .route("/v1/completions", post(generate::generate))
        .route("/v1/chat/completions", post(chat::chat))
        .route("/v1/embeddings", post(openai::embeddings))
        .route("/v1/models", get(openai::list_models))
        .route("/v1/models/{model}", get(openai::retrieve_model))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
