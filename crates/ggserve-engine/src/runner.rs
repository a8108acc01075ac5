//! Serialized engine access.
//!
//! The native engine handle does not support concurrent invocation, so all
//! calls go through one `EngineRunner` that holds a single async mutex for
//! the duration of each native call. The engine is started lazily on the
//! first inference call, with arguments assembled from the process
//! configuration.

use std::sync::Arc;

use ggserve_core::Config;
use tokio::sync::Mutex;

use crate::args::{embedding_args, inference_args};
use crate::engine::{EngineError, InferenceEngine};
use crate::registry::{ChannelId, ChannelRegistry};

/// Output format requested from the engine for embedding calls. The HTTP
/// layer splits the array form back out per input.
const EMBD_OUTPUT_FORMAT: &str = "array";

#[derive(Debug, Default)]
struct RunnerState {
    running: bool,
}

/// Serializes access to the shared engine handle.
///
/// Streaming calls guarantee the correlation channel is closed exactly once
/// when the native call returns, whether it succeeded or failed — channel
/// closure is the sole termination signal the HTTP layer relies on.
pub struct EngineRunner {
    engine: Arc<dyn InferenceEngine>,
    registry: Arc<ChannelRegistry>,
    config: Arc<Config>,
    state: Mutex<RunnerState>,
}

impl EngineRunner {
    /// Create a runner for the given engine handle.
    pub fn new(
        engine: Arc<dyn InferenceEngine>,
        registry: Arc<ChannelRegistry>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            engine,
            registry,
            config,
            state: Mutex::new(RunnerState::default()),
        }
    }

    /// Run a generate call against `channel`.
    pub async fn generate(&self, channel: ChannelId, request: String) -> Result<(), EngineError> {
        let result = self.run_streaming(channel, request, false).await;
        self.registry.close(channel);
        result
    }

    /// Run a chat call against `channel`.
    pub async fn chat(&self, channel: ChannelId, request: String) -> Result<(), EngineError> {
        let result = self.run_streaming(channel, request, true).await;
        self.registry.close(channel);
        result
    }

    async fn run_streaming(
        &self,
        channel: ChannelId,
        request: String,
        chat: bool,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        self.ensure_started(&mut state).await?;

        let engine = Arc::clone(&self.engine);
        spawn_native(move || {
            if chat {
                engine.chat(channel, &request)
            } else {
                engine.generate(channel, &request)
            }
        })
        .await
    }

    /// Run a one-shot embedding call and return the engine's JSON output.
    pub async fn embedding(&self, prompts: String) -> Result<String, EngineError> {
        if prompts.is_empty() {
            return Err(EngineError::NoInput);
        }
        let model_path = self.model_path()?;
        let args = embedding_args(&self.config, &model_path, EMBD_OUTPUT_FORMAT);

        // Embedding shares the engine handle; serialize against generate/chat.
        let _state = self.state.lock().await;
        let engine = Arc::clone(&self.engine);
        spawn_native(move || engine.embedding(&args, &prompts)).await
    }

    /// Fetch engine properties.
    pub async fn props(&self) -> Result<String, EngineError> {
        let _state = self.state.lock().await;
        let engine = Arc::clone(&self.engine);
        spawn_native(move || engine.props()).await
    }

    /// Fetch active slot state.
    pub async fn slots(&self) -> Result<String, EngineError> {
        let _state = self.state.lock().await;
        let engine = Arc::clone(&self.engine);
        spawn_native(move || engine.slots()).await
    }

    /// Stop the engine if it is running.
    pub async fn stop(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        if !state.running {
            return Ok(());
        }
        let engine = Arc::clone(&self.engine);
        spawn_native(move || engine.stop()).await?;
        state.running = false;
        Ok(())
    }

    async fn ensure_started(&self, state: &mut RunnerState) -> Result<(), EngineError> {
        if state.running {
            return Ok(());
        }
        let model_path = self.model_path()?;
        let args = inference_args(&self.config, &model_path);
        tracing::info!(%args, "starting inference engine");

        let engine = Arc::clone(&self.engine);
        spawn_native(move || engine.start(&args)).await?;
        state.running = true;
        Ok(())
    }

    fn model_path(&self) -> Result<String, EngineError> {
        self.config
            .model_path()
            .map(|p| p.display().to_string())
            .ok_or(EngineError::NoModel)
    }
}

/// Run a blocking native call off the async runtime.
async fn spawn_native<T, F>(call: F) -> Result<T, EngineError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|err| EngineError::Native(err.to_string()))?
}
