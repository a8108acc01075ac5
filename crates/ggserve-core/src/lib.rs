#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod template;

// Re-export primary types
pub use config::{Config, ConfigError, ModelFileInfo, MODEL_EXT};
pub use template::render_chat_prompt;
