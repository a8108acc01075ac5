#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod error;
pub mod listing;
pub mod pull;
pub mod reference;
pub mod resolve;

// Re-export primary types
pub use error::{HfError, HfResult};
pub use listing::{HttpRepoListing, RepoFile, RepoListing};
pub use pull::Puller;
pub use reference::ModelRef;
pub use resolve::resolve_filename;
