//! Model pull: filename resolution plus streamed download.
//!
//! Progress is reported through a callback so the HTTP layer can forward
//! frames to a streaming client. Reports are throttled to one every couple
//! of seconds; the terminal report always fires.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use ggserve_core::api::ProgressResponse;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{HfError, HfResult};
use crate::listing::RepoListing;
use crate::reference::ModelRef;
use crate::resolve::resolve_filename;

/// Minimum interval between intermediate progress reports.
const REPORT_INTERVAL: Duration = Duration::from_secs(2);

/// Callback receiving pull progress frames.
pub type ProgressFn = dyn Fn(ProgressResponse) + Send + Sync;

/// Downloads model files into the local model directory.
pub struct Puller {
    client: reqwest::Client,
    listing: Arc<dyn RepoListing>,
    model_dir: PathBuf,
}

impl Puller {
    /// Create a puller saving files under `model_dir`.
    pub fn new(listing: Arc<dyn RepoListing>, model_dir: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            listing,
            model_dir,
        }
    }

    /// Pull the referenced model, reporting progress along the way.
    pub async fn pull(&self, mut reference: ModelRef, progress: &ProgressFn) -> HfResult<()> {
        progress(status(format!("pulling {reference}")));

        if reference.filename.is_none() {
            progress(status("resolving filename from repository...".to_string()));
            resolve_filename(&mut reference, self.listing.as_ref()).await?;
            if let Some(filename) = &reference.filename {
                progress(status(format!("resolved filename: {filename}")));
            }
        }

        let url = reference.download_url().ok_or(HfError::NoDownloadUrl)?;
        progress(status(format!("download URL: {url}")));

        let local = reference.local_filename().ok_or(HfError::NoDownloadUrl)?;
        let output_path = self.model_dir.join(local);
        progress(status(format!("saving to: {}", output_path.display())));

        self.download(url.as_str(), &output_path, progress).await?;

        progress(status(format!(
            "successfully downloaded to {}",
            output_path.display()
        )));
        Ok(())
    }

    /// Stream `url` into `output_path` with progress reporting. A file that
    /// already exists with the expected size is not downloaded again.
    async fn download(&self, url: &str, output_path: &Path, progress: &ProgressFn) -> HfResult<()> {
        let response = self.client.get(url).send().await?;
        let response_status = response.status();
        if !response_status.is_success() {
            return Err(HfError::DownloadFailed(response_status.as_u16()));
        }

        let total = response
            .content_length()
            .and_then(|l| i64::try_from(l).ok())
            .unwrap_or(-1);

        if let Ok(meta) = fs::metadata(output_path).await
            && total >= 0
            && i64::try_from(meta.len()).is_ok_and(|len| len == total)
        {
            progress(ProgressResponse {
                status: "success".to_string(),
                total: Some(total),
                completed: Some(total),
                ..ProgressResponse::default()
            });
            return Ok(());
        }

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::File::create(output_path).await?;

        progress(ProgressResponse {
            status: "downloading".to_string(),
            total: Some(total),
            ..ProgressResponse::default()
        });

        let mut downloaded: i64 = 0;
        let mut last_report = Instant::now();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += i64::try_from(chunk.len()).unwrap_or(0);

            if last_report.elapsed() >= REPORT_INTERVAL {
                progress(ProgressResponse {
                    status: "downloading".to_string(),
                    total: Some(total),
                    completed: Some(downloaded),
                    ..ProgressResponse::default()
                });
                last_report = Instant::now();
            }
        }
        file.flush().await?;

        progress(ProgressResponse {
            status: "success".to_string(),
            total: Some(total),
            completed: Some(downloaded),
            ..ProgressResponse::default()
        });
        Ok(())
    }
}

fn status(message: String) -> ProgressResponse {
    ProgressResponse {
        status: message,
        ..ProgressResponse::default()
    }
}
