//! Integration tests for the HTTP surface.
//!
//! Routes are exercised through `tower::ServiceExt::oneshot` against a
//! scripted engine, so every assertion covers the full
//! validate → channel → background call → framing pipeline.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use ggserve_axum::routes::create_router;
use ggserve_axum::state::ServerContext;
use ggserve_core::Config;
use ggserve_engine::testing::{StubCall, StubEngine};
use ggserve_engine::{ChannelRegistry, InferenceEngine};
use ggserve_hf::listing::testing::FakeListing;
use ggserve_hf::RepoListing;
use tempfile::TempDir;

fn write_model(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"gguf").unwrap();
}

fn test_config(model_dir: &Path) -> Config {
    Config {
        model: "m.gguf".to_string(),
        model_dir: model_dir.to_path_buf(),
        ..Config::default()
    }
}

struct Harness {
    registry: Arc<ChannelRegistry>,
    _model_dir: TempDir,
    config: Config,
}

impl Harness {
    fn new() -> Self {
        let model_dir = TempDir::new().unwrap();
        write_model(model_dir.path(), "m.gguf");
        let config = test_config(model_dir.path());
        Self {
            registry: Arc::new(ChannelRegistry::new()),
            _model_dir: model_dir,
            config,
        }
    }

    fn stub(&self) -> StubEngine {
        StubEngine::new(Arc::clone(&self.registry))
    }

    fn router(&self, engine: Arc<StubEngine>) -> axum::Router {
        let listing: Arc<dyn RepoListing> = Arc::new(FakeListing::with_files(["model.gguf"]));
        let state = Arc::new(ServerContext::new(
            Arc::new(self.config.clone()),
            Arc::clone(&self.registry),
            engine as Arc<dyn InferenceEngine>,
            listing,
        ));
        create_router(state)
    }
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// Liveness and version
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_liveness_string() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ggserve is running");
}

#[tokio::test]
async fn version_reports_crate_version() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(Request::builder().uri("/api/version").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["version"].is_string());
}

// ────────────────────────────────────────────────────────────────────────────
// Generate
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn generate_missing_body_is_bad_request() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(post_json("/api/generate", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "missing request body");
}

#[tokio::test]
async fn generate_malformed_json_is_bad_request() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(post_json("/api/generate", "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn generate_empty_prompt_with_zero_keepalive_unloads_without_engine_call() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub());
    let app = harness.router(Arc::clone(&engine));

    let response = app
        .oneshot(post_json("/api/generate", r#"{"prompt":"","keep_alive":0}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["done"], true);
    assert_eq!(json["done_reason"], "unload");
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn generate_empty_prompt_alone_loads() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub());
    let app = harness.router(Arc::clone(&engine));

    let response = app
        .oneshot(post_json("/api/generate", r#"{"prompt":""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["done"], true);
    assert_eq!(json["done_reason"], "load");
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn generate_streams_ndjson_chunks() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub().with_chunks(["foo"]));
    let app = harness.router(engine);

    let mut request = post_json("/api/generate", r#"{"prompt":"hi"}"#);
    request
        .headers_mut()
        .insert(header::ACCEPT, "application/x-ndjson".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/x-ndjson"
    );
    assert_eq!(body_string(response).await, "foo\n");
}

#[tokio::test]
async fn generate_templates_prompt_unless_raw() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub().with_chunks(["x"]));
    let app = harness.router(Arc::clone(&engine));

    let response = app
        .oneshot(post_json(
            "/api/generate",
            r#"{"prompt":"hi","system":"be brief"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    // Drain the streaming body so the background call has completed.
    let _ = body_string(response).await;

    let calls = engine.calls();
    let payload = calls
        .iter()
        .find_map(|c| match c {
            StubCall::Generate(p) => Some(p.clone()),
            _ => None,
        })
        .expect("engine received a generate call");
    let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
    let prompt = json["prompt"].as_str().unwrap();
    assert!(prompt.contains("<|im_start|>system\nbe brief<|im_end|>"));
    assert!(prompt.contains("<|im_start|>user\nhi<|im_end|>"));
    assert!(prompt.ends_with("<|im_start|>assistant"));
}

#[tokio::test]
async fn generate_raw_passes_prompt_verbatim() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub().with_chunks(["x"]));
    let app = harness.router(Arc::clone(&engine));

    let response = app
        .oneshot(post_json("/api/generate", r#"{"prompt":"hi","raw":true}"#))
        .await
        .unwrap();
    let _ = body_string(response).await;

    let calls = engine.calls();
    let payload = calls
        .iter()
        .find_map(|c| match c {
            StubCall::Generate(p) => Some(p.clone()),
            _ => None,
        })
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(json["prompt"], "hi");
    assert_eq!(json["stream"], true);
}

#[tokio::test]
async fn generate_collects_when_stream_false() {
    let harness = Harness::new();
    let engine = Arc::new(
        harness
            .stub()
            .with_chunks([r#"{"response":"hello","#, r#""done":true}"#]),
    );
    let app = harness.router(engine);

    let response = app
        .oneshot(post_json(
            "/api/generate",
            r#"{"prompt":"hi","stream":false}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["response"], "hello");
    assert_eq!(json["done"], true);
}

#[tokio::test]
async fn generate_collect_with_no_output_is_no_content_error() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub()); // streams nothing
    let app = harness.router(engine);

    let response = app
        .oneshot(post_json(
            "/api/generate",
            r#"{"prompt":"hi","stream":false}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "no content");
}

#[tokio::test]
async fn generate_collect_with_invalid_json_is_an_error() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub().with_chunks(["not json"]));
    let app = harness.router(engine);

    let response = app
        .oneshot(post_json(
            "/api/generate",
            r#"{"prompt":"hi","stream":false}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "invalid json");
}

#[tokio::test]
async fn generate_failing_engine_truncates_stream() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub().failing());
    let app = harness.router(engine);

    let mut request = post_json("/api/generate", r#"{"prompt":"hi"}"#);
    request
        .headers_mut()
        .insert(header::ACCEPT, "application/x-ndjson".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    // Headers already sent; the failure can only end the stream early.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");
}

// ────────────────────────────────────────────────────────────────────────────
// Chat
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_requires_messages() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(post_json("/api/chat", r#"{"messages":[]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "no messages provided");
}

#[tokio::test]
async fn chat_forwards_raw_body_to_engine() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub().with_chunks(["x"]));
    let app = harness.router(Arc::clone(&engine));

    let body = r#"{"messages":[{"role":"user","content":"hi"}],"options":{"temperature":0.1}}"#;
    let response = app.oneshot(post_json("/api/chat", body)).await.unwrap();
    let _ = body_string(response).await;

    let calls = engine.calls();
    let payload = calls
        .iter()
        .find_map(|c| match c {
            StubCall::Chat(p) => Some(p.clone()),
            _ => None,
        })
        .expect("engine received a chat call");
    assert_eq!(payload, body);
}

#[tokio::test]
async fn chat_collects_when_stream_false() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub().with_chunks([
        r#"{"message":{"role":"assistant","#,
        r#""content":"hello"},"done":true}"#,
    ]));
    let app = harness.router(engine);

    let response = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"messages":[{"role":"user","content":"hi"}],"stream":false}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"]["content"], "hello");
    assert_eq!(json["done"], true);
}

#[tokio::test]
async fn chat_streams_sse_frames() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub().with_chunks(["tok1", "tok2"]));
    let app = harness.router(engine);

    let mut request = post_json(
        "/api/chat",
        r#"{"messages":[{"role":"user","content":"hi"}]}"#,
    );
    request
        .headers_mut()
        .insert(header::ACCEPT, "text/event-stream".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
    assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "no-cache");
    assert_eq!(body_string(response).await, "data: tok1\n\ndata: tok2\n\n");
}

// ────────────────────────────────────────────────────────────────────────────
// Embeddings
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn embed_joins_inputs_with_separator() {
    let harness = Harness::new();
    let engine = Arc::new(
        harness
            .stub()
            .with_embedding_output("[[0.1,0.2],[0.3,0.4]]"),
    );
    let app = harness.router(Arc::clone(&engine));

    let response = app
        .oneshot(post_json("/api/embed", r#"{"model":"m","input":["a","b"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["embeddings"].as_array().unwrap().len(), 2);
    assert_eq!(json["prompt_eval_count"], 2);

    let (_args, prompts) = engine.last_embedding_call().unwrap();
    assert_eq!(prompts, "a<#sep#>b");
}

#[tokio::test]
async fn embed_count_mismatch_is_an_error() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub().with_embedding_output("[[0.1]]"));
    let app = harness.router(engine);

    let response = app
        .oneshot(post_json("/api/embed", r#"{"model":"m","input":["a","b"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(
        json["error"].as_str().unwrap().contains("1 != 2"),
        "expected count mismatch, got: {json}"
    );
}

#[tokio::test]
async fn embed_empty_input_returns_empty_list_without_engine_call() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub());
    let app = harness.router(Arc::clone(&engine));

    let response = app
        .oneshot(post_json("/api/embed", r#"{"model":"m","input":""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["embeddings"], serde_json::json!([]));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn embed_invalid_input_type_is_bad_request() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(post_json("/api/embed", r#"{"model":"m","input":[1,2]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid input type");
}

#[tokio::test]
async fn embeddings_legacy_empty_prompt_loads_model() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(post_json("/api/embeddings", r#"{"model":"m","prompt":""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["embedding"], serde_json::json!([]));
}

#[tokio::test]
async fn embeddings_legacy_returns_first_vector() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub().with_embedding_output("[[0.5,0.25]]"));
    let app = harness.router(engine);

    let response = app
        .oneshot(post_json("/api/embeddings", r#"{"model":"m","prompt":"hi"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["embedding"],
        serde_json::json!([0.5, 0.25])
    );
}

// ────────────────────────────────────────────────────────────────────────────
// Model listing
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tags_lists_models_from_directory() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(Request::builder().uri("/api/tags").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let models = json["models"].as_array().unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0]["name"], "m.gguf");
    assert_eq!(models[0]["details"]["format"], "gguf");
}

#[tokio::test]
async fn show_returns_model_details() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(post_json("/api/show", r#"{"model":"m.gguf"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["modelfile"], "m.gguf");
    assert_eq!(json["capabilities"], serde_json::json!(["thinking"]));
}

#[tokio::test]
async fn show_unknown_model_is_not_found() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(post_json("/api/show", r#"{"model":"missing.gguf"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "model 'missing.gguf' not found"
    );
}

#[tokio::test]
async fn ps_reports_empty_running_set() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(Request::builder().uri("/api/ps").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["models"], serde_json::json!([]));
}

// ────────────────────────────────────────────────────────────────────────────
// Engine introspection
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn props_passes_engine_json_through() {
    let harness = Harness::new();
    let engine = Arc::new(harness.stub().with_props(r#"{"build_info":"b123","n_ctx":4096}"#));
    let app = harness.router(engine);

    let response = app
        .oneshot(Request::builder().uri("/props").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["build_info"], "b123");
    assert_eq!(json["n_ctx"], 4096);
}

#[tokio::test]
async fn props_change_is_rejected_unless_enabled() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(post_json("/props", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("--props"));
}

#[tokio::test]
async fn slots_passes_engine_json_through() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(Request::builder().uri("/slots").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

// ────────────────────────────────────────────────────────────────────────────
// Pull
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pull_rejects_unparseable_reference() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(post_json("/api/pull", r#"{"model":""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .starts_with("failed to parse model reference")
    );
}

#[tokio::test]
async fn pull_streams_progress_frames() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    // The canned listing has no file matching the pattern, so the pull
    // fails after the initial progress frames; the failure must surface as
    // a final NDJSON error frame.
    let mut request = post_json("/api/pull", r#"{"model":"unsloth/llama-3-8b:Q4_K_M"}"#);
    request
        .headers_mut()
        .insert(header::ACCEPT, "application/x-ndjson".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    let lines: Vec<&str> = body.lines().collect();
    assert!(lines.len() >= 2, "expected several frames, got: {body}");
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert!(first["status"].as_str().unwrap().contains("pulling"));
    let last: serde_json::Value = serde_json::from_str(lines[lines.len() - 1]).unwrap();
    assert!(last["error"].is_string());
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI compatibility
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn v1_models_lists_openai_shapes() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(Request::builder().uri("/v1/models").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["object"], "list");
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], "m.gguf");
    assert_eq!(data[0]["object"], "model");
    assert!(data[0]["created"].is_i64());
    assert_eq!(data[0]["owned_by"], "ggserve");
}

#[tokio::test]
async fn v1_retrieve_model_maps_show_response() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/models/m.gguf")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], "m.gguf");
    assert_eq!(json["object"], "model");
}

#[tokio::test]
async fn v1_retrieve_unknown_model_uses_openai_error_envelope() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/models/missing.gguf")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["type"], "not_found_error");
    assert!(json["error"]["message"].as_str().unwrap().contains("missing.gguf"));
}

#[tokio::test]
async fn v1_embeddings_wraps_native_embed() {
    let harness = Harness::new();
    let engine = Arc::new(
        harness
            .stub()
            .with_embedding_output("[[0.1,0.2],[0.3,0.4]]"),
    );
    let app = harness.router(engine);

    let response = app
        .oneshot(post_json("/v1/embeddings", r#"{"model":"m","input":["a","b"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["object"], "list");
    assert_eq!(json["model"], "m");
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["object"], "embedding");
    assert_eq!(data[1]["index"], 1);
    assert_eq!(json["usage"]["prompt_tokens"], 2);
}

#[tokio::test]
async fn v1_embeddings_missing_input_is_invalid_request() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(post_json("/v1/embeddings", r#"{"model":"m"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["type"], "invalid_request_error");
    assert_eq!(json["error"]["message"], "invalid input");
}

#[tokio::test]
async fn v1_embeddings_empty_string_reaches_the_engine_boundary() {
    // An empty string is normalized to [""] rather than rejected up front;
    // the resulting empty prompt is then refused at the engine boundary.
    let harness = Harness::new();
    let engine = Arc::new(harness.stub().with_embedding_output("[[0.0]]"));
    let app = harness.router(Arc::clone(&engine));

    let response = app
        .oneshot(post_json("/v1/embeddings", r#"{"model":"m","input":""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"]["type"], "api_error");
    assert_eq!(json["error"]["message"], "no prompt or input provided");
}

// ────────────────────────────────────────────────────────────────────────────
// Routing
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_route_is_not_found() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(Request::builder().uri("/api/nonexistent").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn v1_completions_aliases_generate() {
    let harness = Harness::new();
    let app = harness.router(Arc::new(harness.stub()));

    let response = app
        .oneshot(post_json("/v1/completions", r#"{"prompt":"","keep_alive":0}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["done_reason"], "unload");
}
