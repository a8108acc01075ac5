#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod args;
pub mod engine;
pub mod registry;
pub mod runner;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export primary types
pub use engine::{EngineError, EngineUnavailable, InferenceEngine};
pub use registry::{ChannelId, ChannelRegistry, StreamEvent, StreamReceiver};
pub use runner::EngineRunner;
