//! Error types for model reference and registry operations.

use thiserror::Error;

/// Result type alias for registry operations.
pub type HfResult<T> = Result<T, HfError>;

/// Errors related to model references and the remote registry.
#[derive(Debug, Error)]
pub enum HfError {
    /// The model reference string could not be parsed.
    #[error("invalid model reference: {0}")]
    InvalidReference(String),

    /// API request failed with an HTTP error status.
    #[error("registry request failed with status {status}: {url}")]
    ApiRequestFailed {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// The repository contains no GGUF files.
    #[error("no GGUF files found in repository")]
    NoGgufFiles,

    /// No file matched the requested selection pattern.
    #[error("no files matching pattern '{0}' found")]
    PatternNotMatched(String),

    /// The reference is missing pieces required to build a download URL.
    #[error("failed to build download URL")]
    NoDownloadUrl,

    /// Download failed with an HTTP error status.
    #[error("download failed with status {0}")]
    DownloadFailed(u16),

    /// Network or HTTP client error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Local filesystem error while saving a model file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}
