//! Engine argument-string assembly.
//!
//! The native engine is configured with a single argument string. A flag is
//! appended only when the configured value differs from the engine's own
//! documented default: omitting a flag keeps the engine's internal
//! default-resolution intact (some defaults are computed from the model
//! file and must not be clobbered).

use std::fmt::Display;

use ggserve_core::Config;
use ggserve_core::config::RANDOM_SEED;

/// Engine-documented defaults. Values equal to these are not passed.
pub mod defaults {
    /// Default prompt context size.
    pub const CTX_SIZE: u32 = 4096;
    /// Default GPU layer count (engine decides).
    pub const N_GPU_LAYERS: i32 = -1;
    /// Default prediction limit (until EOS).
    pub const N_PREDICT: i32 = -1;
    /// Default logical batch size.
    pub const BATCH_SIZE: u32 = 2048;
    /// Default physical batch size.
    pub const UBATCH_SIZE: u32 = 512;
    /// Default embedding normalization (euclidean).
    pub const EMBD_NORMALIZE: i32 = 2;
}

/// Builder for engine argument strings.
#[derive(Debug)]
pub struct ArgString {
    parts: Vec<String>,
}

impl ArgString {
    /// Start an argument string with the program name.
    pub fn new(program: &str) -> Self {
        Self {
            parts: vec![program.to_string()],
        }
    }

    /// Append a bare flag.
    pub fn flag(mut self, name: &str) -> Self {
        self.parts.push(name.to_string());
        self
    }

    /// Append a flag with a value.
    pub fn arg(mut self, name: &str, value: impl Display) -> Self {
        self.parts.push(name.to_string());
        self.parts.push(value.to_string());
        self
    }

    /// Append a flag with a value only when `cond` holds.
    pub fn arg_if(self, cond: bool, name: &str, value: impl Display) -> Self {
        if cond { self.arg(name, value) } else { self }
    }

    /// Join into the final argument string.
    pub fn build(self) -> String {
        self.parts.join(" ")
    }
}

/// Assemble the argument string for interactive/streaming inference.
pub fn inference_args(config: &Config, model_path: &str) -> String {
    ArgString::new("llama")
        .flag("-i")
        .arg("--model", model_path)
        .arg_if(config.ctx_size != defaults::CTX_SIZE, "--ctx-size", config.ctx_size)
        .arg_if(
            config.n_gpu_layers != defaults::N_GPU_LAYERS,
            "--n-gpu-layers",
            config.n_gpu_layers,
        )
        .arg_if(config.n_predict != defaults::N_PREDICT, "--n-predict", config.n_predict)
        .arg_if(config.seed != RANDOM_SEED, "--seed", config.seed)
        .build()
}

/// Assemble the argument string for a one-shot embedding call.
///
/// `output_format` is chosen by the caller, not the configuration: the HTTP
/// layer always requests the array form it knows how to split back out.
pub fn embedding_args(config: &Config, model_path: &str, output_format: &str) -> String {
    let mut args = ArgString::new("llama")
        .arg("--model", model_path)
        .arg_if(config.ctx_size != defaults::CTX_SIZE, "--ctx-size", config.ctx_size)
        .arg_if(
            config.n_gpu_layers != defaults::N_GPU_LAYERS,
            "--n-gpu-layers",
            config.n_gpu_layers,
        )
        .arg_if(config.n_predict != defaults::N_PREDICT, "--n-predict", config.n_predict)
        .arg_if(config.seed != RANDOM_SEED, "--seed", config.seed)
        .arg_if(
            config.embd_normalize != defaults::EMBD_NORMALIZE,
            "--embd-normalize",
            config.embd_normalize,
        )
        .arg_if(config.batch_size != defaults::BATCH_SIZE, "--batch-size", config.batch_size)
        .arg_if(
            config.ubatch_size != defaults::UBATCH_SIZE,
            "--ubatch-size",
            config.ubatch_size,
        );

    if !config.pooling.is_empty() {
        args = args.arg("--pooling", &config.pooling);
    }
    if !output_format.is_empty() {
        args = args.arg("--embd-output-format", output_format);
    }
    if !config.embd_separator.is_empty() {
        args = args.arg("--embd-separator", &config.embd_separator);
    }

    args.build()
}
