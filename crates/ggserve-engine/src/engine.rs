//! The opaque native engine call boundary.
//!
//! The engine is treated as a synchronous black box: calls block until the
//! native side returns, and streaming calls push their output through the
//! [`ChannelRegistry`](crate::registry::ChannelRegistry) under the
//! correlation ID supplied at call time. A production build implements this
//! trait with its native interop of choice; tests use the scripted stub in
//! [`crate::testing`].

use thiserror::Error;

use crate::registry::ChannelId;

/// Errors at the engine call boundary. None of these are retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// No model configured.
    #[error("no model configured")]
    NoModel,

    /// No prompt or input provided.
    #[error("no prompt or input provided")]
    NoInput,

    /// The native call reported failure.
    #[error("native call failed: {0}")]
    Native(String),
}

/// Synchronous interface to the native inference engine.
///
/// Implementations are not expected to support concurrent invocation; the
/// [`EngineRunner`](crate::runner::EngineRunner) serializes all access to a
/// single handle.
pub trait InferenceEngine: Send + Sync {
    /// Start the engine with the given argument string.
    fn start(&self, args: &str) -> Result<(), EngineError>;

    /// Stop the engine.
    fn stop(&self) -> Result<(), EngineError>;

    /// Run a generate call. Output chunks are pushed under `channel`;
    /// blocks until generation finishes or fails.
    fn generate(&self, channel: ChannelId, request: &str) -> Result<(), EngineError>;

    /// Run a chat call. Same streaming contract as [`generate`](Self::generate).
    fn chat(&self, channel: ChannelId, request: &str) -> Result<(), EngineError>;

    /// Run a one-shot embedding call; returns the engine's JSON output.
    fn embedding(&self, args: &str, prompts: &str) -> Result<String, EngineError>;

    /// Engine properties as a JSON document.
    fn props(&self) -> Result<String, EngineError>;

    /// Active slot state as a JSON document.
    fn slots(&self) -> Result<String, EngineError>;
}

/// Placeholder engine used when no native engine is linked into the build.
///
/// Lifecycle calls succeed so the HTTP surface, model listing, pull and
/// probe endpoints stay functional; inference calls fail with a clear
/// message.
#[derive(Debug, Default, Clone, Copy)]
pub struct EngineUnavailable;

impl EngineUnavailable {
    const MESSAGE: &'static str = "inference engine not linked into this build";
}

impl InferenceEngine for EngineUnavailable {
    fn start(&self, _args: &str) -> Result<(), EngineError> {
        Ok(())
    }

    fn stop(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn generate(&self, _channel: ChannelId, _request: &str) -> Result<(), EngineError> {
        Err(EngineError::Native(Self::MESSAGE.to_string()))
    }

    fn chat(&self, _channel: ChannelId, _request: &str) -> Result<(), EngineError> {
        Err(EngineError::Native(Self::MESSAGE.to_string()))
    }

    fn embedding(&self, _args: &str, _prompts: &str) -> Result<String, EngineError> {
        Err(EngineError::Native(Self::MESSAGE.to_string()))
    }

    fn props(&self) -> Result<String, EngineError> {
        Err(EngineError::Native(Self::MESSAGE.to_string()))
    }

    fn slots(&self) -> Result<String, EngineError> {
        Err(EngineError::Native(Self::MESSAGE.to_string()))
    }
}
