//! Process-wide configuration.
//!
//! Loaded once at startup by the CLI composition root and read-only after
//! that. Everything the engine argument assembly and the HTTP layer need
//! (model location, context/batch sizing, embedding options, bind address,
//! CORS origins) lives here.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

/// File extension recognized as a servable model.
pub const MODEL_EXT: &str = ".gguf";

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "127.0.0.1:8081";

const DEFAULT_PORT: u16 = 8081;

/// Seed sentinel meaning "let the engine pick a random seed".
pub const RANDOM_SEED: u32 = u32::MAX;

/// Configuration errors surfaced during startup validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configured model does not resolve to a usable file path.
    #[error("model '{0}' does not resolve to a {MODEL_EXT} file")]
    InvalidModel(String),
}

/// Read-only process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Model file name (relative to `model_dir`) or an absolute path.
    pub model: String,
    /// Directory holding downloaded model files.
    pub model_dir: PathBuf,
    /// Prompt context size.
    pub ctx_size: u32,
    /// Layers offloaded to the GPU (-1 = engine decides).
    pub n_gpu_layers: i32,
    /// Tokens to predict (-1 = until EOS).
    pub n_predict: i32,
    /// RNG seed; [`RANDOM_SEED`] means random.
    pub seed: u32,
    /// Embedding pooling strategy; empty uses the model default.
    pub pooling: String,
    /// Embedding normalization (-1 none, 2 euclidean, ...).
    pub embd_normalize: i32,
    /// Embedding output format requested from the engine.
    pub embd_output_format: String,
    /// Separator joining multiple embedding inputs into one engine call.
    pub embd_separator: String,
    /// Logical maximum batch size.
    pub batch_size: u32,
    /// Physical maximum batch size.
    pub ubatch_size: u32,
    /// Bind address, `host[:port]` with optional scheme.
    pub host: String,
    /// Extra allowed CORS origins.
    pub origins: Vec<String>,
    /// Whether `POST /props` is allowed to change global properties.
    pub props_endpoint: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: String::new(),
            model_dir: PathBuf::from("./data/models"),
            ctx_size: 4096,
            n_gpu_layers: -1,
            n_predict: -1,
            seed: RANDOM_SEED,
            pooling: String::new(),
            embd_normalize: 2,
            embd_output_format: "json".to_string(),
            embd_separator: "<#sep#>".to_string(),
            batch_size: 2048,
            ubatch_size: 512,
            host: DEFAULT_HOST.to_string(),
            origins: Vec::new(),
            props_endpoint: false,
        }
    }
}

/// Metadata for one model file found on disk.
#[derive(Debug, Clone)]
pub struct ModelFileInfo {
    /// Bare file name, used as the model name on the wire.
    pub name: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified_at: DateTime<Utc>,
}

impl Config {
    /// Resolve the configured model to an absolute path.
    ///
    /// Returns `None` when no model is configured or the name does not carry
    /// the model extension. A name that is already a path to an existing
    /// file is used as-is; otherwise it is looked up under `model_dir`.
    pub fn model_path(&self) -> Option<PathBuf> {
        if self.model.is_empty() || !self.model.contains(MODEL_EXT) {
            return None;
        }
        let direct = Path::new(&self.model);
        if direct.is_file() {
            return Some(direct.to_path_buf());
        }
        Some(self.model_dir.join(&self.model))
    }

    /// Whether a model is configured.
    pub fn has_model(&self) -> bool {
        self.model_path().is_some()
    }

    /// Validate the configuration at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.model.is_empty() && self.model_path().is_none() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }
        Ok(())
    }

    /// List model files in the model directory (by extension), including the
    /// configured model when it lives outside the directory.
    pub fn model_file_infos(&self) -> Vec<ModelFileInfo> {
        let mut infos = Vec::new();

        if self.model_dir.is_dir() {
            match fs::read_dir(&self.model_dir) {
                Ok(entries) => {
                    for entry in entries.flatten() {
                        let path = entry.path();
                        if !path.is_file() || !has_model_ext(&path) {
                            continue;
                        }
                        if let Some(info) = file_info(&path) {
                            infos.push(info);
                        }
                    }
                }
                Err(err) => {
                    tracing::error!(dir = %self.model_dir.display(), error = %err, "failed to read model directory");
                }
            }
        }

        // The configured model may point outside the directory; list it too.
        if let Some(path) = self.model_path() {
            let already_listed = infos.iter().any(|i| i.path == path);
            if !already_listed
                && let Some(info) = file_info(&path)
            {
                infos.push(info);
            }
        }

        infos
    }

    /// Normalize the configured host into a full URL.
    ///
    /// Accepts `host`, `host:port`, and `scheme://host:port` forms; missing
    /// pieces fall back to `http`, `127.0.0.1` and the default port.
    pub fn host_url(&self) -> Url {
        let (scheme, rest) = match self.host.split_once("://") {
            Some((s, r)) if s == "http" || s == "https" => (s, r),
            _ => ("http", self.host.as_str()),
        };
        let default_port = match scheme {
            "https" => 443,
            _ if self.host.starts_with("http://") => 80,
            _ => DEFAULT_PORT,
        };

        let hostport = rest.split('/').next().unwrap_or("");
        let (host, port) = match hostport.rsplit_once(':') {
            Some((h, p)) => match p.parse::<u16>() {
                Ok(port) => (h, port),
                Err(_) => {
                    tracing::warn!(port = p, default = default_port, "invalid port, using default");
                    (h, default_port)
                }
            },
            None => (hostport, default_port),
        };
        let host = if host.is_empty() { "127.0.0.1" } else { host };

        Url::parse(&format!("{scheme}://{host}:{port}"))
            .unwrap_or_else(|_| Url::parse(&format!("http://127.0.0.1:{DEFAULT_PORT}")).expect("default URL is valid"))
    }

    /// Allowed CORS origins: configured origins plus loopback expansions.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = self.origins.clone();
        for origin in ["localhost", "127.0.0.1", "0.0.0.0"] {
            origins.push(format!("http://{origin}"));
            origins.push(format!("https://{origin}"));
        }
        origins
    }
}

fn has_model_ext(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(&MODEL_EXT[1..]))
}

fn file_info(path: &Path) -> Option<ModelFileInfo> {
    let meta = fs::metadata(path).ok()?;
    let name = path.file_name()?.to_str()?.to_string();
    let modified_at = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    Some(ModelFileInfo {
        name,
        path: path.to_path_buf(),
        size: meta.len(),
        modified_at,
    })
}
