//! Pull endpoint: `POST /api/pull`.
//!
//! Downloads a model from the remote registry, streaming progress frames to
//! the client. Pull uses its own channel rather than the correlation
//! registry — there is no engine call to correlate.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use ggserve_core::api::{ProgressResponse, PullRequest, wants_stream};
use ggserve_engine::{StreamEvent, StreamReceiver};
use ggserve_hf::ModelRef;
use tokio::sync::mpsc;

use crate::error::HttpError;
use crate::handlers::{accept_header, parse_json};
use crate::state::AppState;
use crate::stream;

/// Handle a pull request.
pub async fn pull(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpError> {
    let req: PullRequest = parse_json(&body)?;

    let reference: ModelRef = req
        .model
        .parse()
        .map_err(|err| HttpError::BadRequest(format!("failed to parse model reference: {err}")))?;

    let (tx, rx) = mpsc::unbounded_channel();
    let task_state = Arc::clone(&state);
    tokio::spawn(async move {
        let progress_tx = tx.clone();
        let report = move |progress: ProgressResponse| {
            match serde_json::to_string(&progress) {
                Ok(frame) => {
                    // Receiver may be gone if the client disconnected.
                    let _ = progress_tx.send(StreamEvent::Chunk(frame));
                }
                Err(err) => tracing::warn!(error = %err, "failed to serialize pull progress"),
            }
        };

        if let Err(err) = task_state.puller.pull(reference, &report).await {
            tracing::warn!(error = %err, "pull failed");
            let _ = tx.send(StreamEvent::Error(err.to_string()));
        }
        // Dropping the senders ends the client's drain.
    });

    if !wants_stream(req.stream) {
        return wait_for_pull(rx).await.map(|p| Json(p).into_response());
    }

    Ok(stream::stream_response(rx, accept_header(&headers)))
}

/// Drain the pull channel for a non-streaming client: the latest progress
/// frame wins, an error frame fails the request.
async fn wait_for_pull(mut receiver: StreamReceiver) -> Result<ProgressResponse, HttpError> {
    let mut latest = ProgressResponse::default();
    while let Some(event) = receiver.recv().await {
        match event {
            StreamEvent::Chunk(frame) => {
                if let Ok(progress) = serde_json::from_str::<ProgressResponse>(&frame) {
                    latest = progress;
                }
            }
            StreamEvent::Error(message) => return Err(HttpError::Internal(message)),
        }
    }
    Ok(latest)
}
