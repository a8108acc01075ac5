//! CLI entry point - the composition root.
//!
//! Flag parsing and logging setup only; everything else is wired through
//! `ggserve_axum::build_state`. A production build swaps the engine handle
//! for one backed by the native runtime.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ggserve_axum::{build_state, start_server};
use ggserve_core::Config;
use ggserve_core::config::{DEFAULT_HOST, RANDOM_SEED};
use ggserve_engine::EngineUnavailable;

/// Serve local GGUF models over an Ollama-compatible HTTP API.
#[derive(Debug, Parser)]
#[command(name = "ggserve", version, about)]
struct Cli {
    /// Logging level {trace, debug, info, warn, error}
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Model file in the model directory, or an absolute path
    #[arg(short, long, default_value = "")]
    model: String,

    /// Path for storing model files
    #[arg(long, default_value = "./data/models", env = "GGSERVE_MODEL_DIR")]
    model_dir: PathBuf,

    /// Size of the prompt context
    #[arg(short, long, default_value_t = 4096)]
    ctx_size: u32,

    /// Layers offloaded to the GPU when compiled with GPU support
    #[arg(long = "n-gpu-layers", default_value_t = -1)]
    n_gpu_layers: i32,

    /// Number of tokens to predict (-1 = until EOS)
    #[arg(short, long = "n-predict", default_value_t = -1)]
    n_predict: i32,

    /// RNG seed (default: random)
    #[arg(short, long, default_value_t = RANDOM_SEED)]
    seed: u32,

    /// Pooling type for embeddings {none,mean,cls,last,rank}; model default if unset
    #[arg(long, default_value = "")]
    pooling: String,

    /// Normalisation for embeddings (-1=none, 2=euclidean, >2=p-norm)
    #[arg(long, default_value_t = 2)]
    embd_normalize: i32,

    /// Embedding output format ("array", "json", "json+")
    #[arg(long, default_value = "json")]
    embd_output_format: String,

    /// Separator between embedding inputs
    #[arg(long, default_value = "<#sep#>")]
    embd_separator: String,

    /// Logical maximum batch size
    #[arg(short, long, default_value_t = 2048)]
    batch_size: u32,

    /// Physical maximum batch size
    #[arg(long, default_value_t = 512)]
    ubatch_size: u32,

    /// Bind address for the server
    #[arg(long, default_value = DEFAULT_HOST, env = "GGSERVE_HOST")]
    host: String,

    /// Comma separated list of extra allowed origins
    #[arg(long, env = "GGSERVE_ORIGINS")]
    origins: Option<String>,

    /// Allow POST /props to change global properties
    #[arg(long)]
    props: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            model: self.model,
            model_dir: self.model_dir,
            ctx_size: self.ctx_size,
            n_gpu_layers: self.n_gpu_layers,
            n_predict: self.n_predict,
            seed: self.seed,
            pooling: self.pooling,
            embd_normalize: self.embd_normalize,
            embd_output_format: self.embd_output_format,
            embd_separator: self.embd_separator,
            batch_size: self.batch_size,
            ubatch_size: self.ubatch_size,
            host: self.host,
            origins: self
                .origins
                .map(|o| o.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            props_endpoint: self.props,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = cli.into_config();
    config.validate()?;
    if !config.has_model() {
        tracing::warn!("no model configured; inference endpoints will fail until one is pulled");
    }

    let state = build_state(config, Arc::new(EngineUnavailable));
    start_server(state).await
}
