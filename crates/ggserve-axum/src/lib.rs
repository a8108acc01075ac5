#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod openai;
pub mod routes;
pub mod state;
pub mod stream;

// Re-export primary types
pub use bootstrap::{build_state, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use state::{AppState, ServerContext};
