//! Remote repository file listing.
//!
//! The registry's tree API is an external collaborator: handlers and the
//! resolver talk to it through the [`RepoListing`] trait so tests can
//! inject canned listings.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{HfError, HfResult};
use crate::reference::ModelRef;

/// One file entry of the repository tree listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoFile {
    /// Path within the repository.
    pub path: String,
    /// Entry type reported by the API ("file" or "directory").
    #[serde(rename = "type")]
    pub entry_type: String,
    /// File size in bytes.
    #[serde(default)]
    pub size: u64,
}

impl RepoFile {
    /// Whether this entry is a GGUF file.
    pub fn is_gguf(&self) -> bool {
        self.entry_type == "file" && self.path.to_lowercase().ends_with(".gguf")
    }
}

/// Port for the remote file-listing API.
#[async_trait]
pub trait RepoListing: Send + Sync {
    /// List the GGUF files of the referenced repository.
    async fn list_gguf_files(&self, reference: &ModelRef) -> HfResult<Vec<RepoFile>>;
}

/// Production listing backend against the registry HTTP API.
pub struct HttpRepoListing {
    client: reqwest::Client,
}

impl HttpRepoListing {
    /// Create a listing backend with its own HTTP client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpRepoListing {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepoListing for HttpRepoListing {
    async fn list_gguf_files(&self, reference: &ModelRef) -> HfResult<Vec<RepoFile>> {
        let url = reference.api_url();
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HfError::ApiRequestFailed {
                status: status.as_u16(),
                url,
            });
        }

        let files: Vec<RepoFile> = response.json().await?;
        Ok(files.into_iter().filter(RepoFile::is_gguf).collect())
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    //! Canned listing backend for tests.

    use super::{HfError, HfResult, ModelRef, RepoFile, RepoListing};
    use async_trait::async_trait;

    /// A listing backend answering with a fixed file list or a fixed error.
    pub struct FakeListing {
        files: Vec<RepoFile>,
        fail_status: Option<u16>,
    }

    impl FakeListing {
        /// Answer every call with these file paths (all typed "file").
        pub fn with_files<I, S>(paths: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                files: paths
                    .into_iter()
                    .map(|p| RepoFile {
                        path: p.into(),
                        entry_type: "file".to_string(),
                        size: 0,
                    })
                    .collect(),
                fail_status: None,
            }
        }

        /// Answer every call with an API error of this status.
        pub fn failing(status: u16) -> Self {
            Self {
                files: Vec::new(),
                fail_status: Some(status),
            }
        }
    }

    #[async_trait]
    impl RepoListing for FakeListing {
        async fn list_gguf_files(&self, reference: &ModelRef) -> HfResult<Vec<RepoFile>> {
            if let Some(status) = self.fail_status {
                return Err(HfError::ApiRequestFailed {
                    status,
                    url: reference.api_url(),
                });
            }
            Ok(self.files.iter().filter(|f| f.is_gguf()).cloned().collect())
        }
    }
}
