//! Ollama-compatible wire types.
//!
//! Request and response bodies for the REST surface. Field names follow the
//! Ollama JSON conventions so existing clients work unchanged.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Streaming defaults to true unless the client sent `"stream": false`.
///
/// The rule is applied uniformly across generate, chat and pull.
pub fn wants_stream(stream: Option<bool>) -> bool {
    stream.unwrap_or(true)
}

/// Keep-alive directive: a duration in seconds or a human string ("5m").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeepAlive {
    /// Numeric duration in seconds.
    Seconds(i64),
    /// Human-readable duration string.
    Text(String),
}

impl KeepAlive {
    /// Whether this directive requests an immediate unload.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Seconds(s) => *s == 0,
            Self::Text(t) => t == "0" || t == "0s",
        }
    }
}

/// Think directive: plain on/off or a graded effort level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThinkValue {
    /// Enable or disable thinking output.
    Bool(bool),
    /// Graded level: "high", "medium" or "low".
    Level(String),
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub system: Option<String>,
    /// Skip prompt templating and send the prompt verbatim.
    #[serde(default)]
    pub raw: bool,
    #[serde(default)]
    pub format: Option<serde_json::Value>,
    /// Opaque engine options, passed through untouched.
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(default)]
    pub keep_alive: Option<KeepAlive>,
    #[serde(default)]
    pub think: Option<ThinkValue>,
}

/// Terminal response for the generate load/unload probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub response: String,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub format: Option<serde_json::Value>,
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(default)]
    pub keep_alive: Option<KeepAlive>,
    #[serde(default)]
    pub think: Option<ThinkValue>,
}

/// Body of `POST /api/embed`. `input` is a string or a list of strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbedRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub keep_alive: Option<KeepAlive>,
    #[serde(default)]
    pub dimensions: Option<usize>,
}

/// Response of `POST /api/embed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub model: String,
    pub embeddings: Vec<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<usize>,
}

/// Body of the legacy `POST /api/embeddings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddingRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
}

/// Response of the legacy `POST /api/embeddings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f64>,
}

/// Model format/family details shared by list and show responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDetails {
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantization_level: Option<String>,
}

/// One entry of `GET /api/tags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListModelResponse {
    pub name: String,
    pub model: String,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
    pub details: ModelDetails,
}

/// Response of `GET /api/tags`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResponse {
    pub models: Vec<ListModelResponse>,
}

/// Body of `POST /api/show`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShowRequest {
    #[serde(default)]
    pub model: String,
}

/// Response of `POST /api/show`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowResponse {
    pub modelfile: String,
    pub details: ModelDetails,
    pub modified_at: DateTime<Utc>,
    pub capabilities: Vec<String>,
}

impl Default for ListModelResponse {
    fn default() -> Self {
        Self {
            name: String::new(),
            model: String::new(),
            size: 0,
            modified_at: Utc::now(),
            details: ModelDetails::default(),
        }
    }
}

impl Default for ShowResponse {
    fn default() -> Self {
        Self {
            modelfile: String::new(),
            details: ModelDetails::default(),
            modified_at: Utc::now(),
            capabilities: Vec::new(),
        }
    }
}

/// One entry of `GET /api/ps`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessModelResponse {
    pub name: String,
    pub model: String,
    pub size: u64,
    pub expires_at: DateTime<Utc>,
}

/// Response of `GET /api/ps`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub models: Vec<ProcessModelResponse>,
}

/// Body of `POST /api/pull`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub stream: Option<bool>,
}

/// One progress frame of the pull stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressResponse {
    #[serde(default)]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<i64>,
}
