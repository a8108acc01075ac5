//! Scripted engine for tests.
//!
//! `StubEngine` implements [`InferenceEngine`] against the real
//! [`ChannelRegistry`], pushing canned chunks for streaming calls and
//! recording every call it receives so tests can assert on the argument
//! strings and payloads that reached the native boundary.

use std::sync::{Arc, Mutex};

use crate::engine::{EngineError, InferenceEngine};
use crate::registry::{ChannelId, ChannelRegistry, StreamEvent};

/// A recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubCall {
    /// `start` with the assembled argument string.
    Start(String),
    /// `stop`.
    Stop,
    /// `generate` with the request payload.
    Generate(String),
    /// `chat` with the request payload.
    Chat(String),
    /// `embedding` with the argument string and the joined prompts.
    Embedding(String, String),
}

/// Scripted [`InferenceEngine`] for tests.
pub struct StubEngine {
    registry: Arc<ChannelRegistry>,
    chunks: Vec<String>,
    embedding_output: String,
    props_output: String,
    slots_output: String,
    fail: bool,
    calls: Mutex<Vec<StubCall>>,
}

impl StubEngine {
    /// Create a stub that streams nothing and answers embedding calls with
    /// an empty array.
    pub fn new(registry: Arc<ChannelRegistry>) -> Self {
        Self {
            registry,
            chunks: Vec::new(),
            embedding_output: "[]".to_string(),
            props_output: r#"{"build_info":"stub","n_ctx":4096}"#.to_string(),
            slots_output: "[]".to_string(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Stream these chunks on every generate/chat call.
    pub fn with_chunks<I, S>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chunks = chunks.into_iter().map(Into::into).collect();
        self
    }

    /// Answer embedding calls with this JSON string.
    pub fn with_embedding_output(mut self, output: &str) -> Self {
        self.embedding_output = output.to_string();
        self
    }

    /// Answer props calls with this JSON string.
    pub fn with_props(mut self, output: &str) -> Self {
        self.props_output = output.to_string();
        self
    }

    /// Fail every inference call with a native error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// All calls recorded so far.
    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().expect("stub mutex poisoned").clone()
    }

    /// Number of `start` calls received.
    pub fn start_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StubCall::Start(_)))
            .count()
    }

    /// Number of `stop` calls received.
    pub fn stop_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StubCall::Stop))
            .count()
    }

    /// Argument string and prompts of the most recent embedding call.
    pub fn last_embedding_call(&self) -> Option<(String, String)> {
        self.calls().into_iter().rev().find_map(|c| match c {
            StubCall::Embedding(args, prompts) => Some((args, prompts)),
            _ => None,
        })
    }

    fn record(&self, call: StubCall) {
        self.calls.lock().expect("stub mutex poisoned").push(call);
    }

    fn stream(&self, channel: ChannelId) -> Result<(), EngineError> {
        if self.fail {
            return Err(EngineError::Native("stub failure".to_string()));
        }
        for chunk in &self.chunks {
            self.registry.push(channel, StreamEvent::Chunk(chunk.clone()));
        }
        Ok(())
    }
}

impl InferenceEngine for StubEngine {
    fn start(&self, args: &str) -> Result<(), EngineError> {
        self.record(StubCall::Start(args.to_string()));
        Ok(())
    }

    fn stop(&self) -> Result<(), EngineError> {
        self.record(StubCall::Stop);
        Ok(())
    }

    fn generate(&self, channel: ChannelId, request: &str) -> Result<(), EngineError> {
        self.record(StubCall::Generate(request.to_string()));
        self.stream(channel)
    }

    fn chat(&self, channel: ChannelId, request: &str) -> Result<(), EngineError> {
        self.record(StubCall::Chat(request.to_string()));
        self.stream(channel)
    }

    fn embedding(&self, args: &str, prompts: &str) -> Result<String, EngineError> {
        self.record(StubCall::Embedding(args.to_string(), prompts.to_string()));
        if self.fail {
            return Err(EngineError::Native("stub failure".to_string()));
        }
        Ok(self.embedding_output.clone())
    }

    fn props(&self) -> Result<String, EngineError> {
        if self.fail {
            return Err(EngineError::Native("stub failure".to_string()));
        }
        Ok(self.props_output.clone())
    }

    fn slots(&self) -> Result<String, EngineError> {
        if self.fail {
            return Err(EngineError::Native("stub failure".to_string()));
        }
        Ok(self.slots_output.clone())
    }
}
