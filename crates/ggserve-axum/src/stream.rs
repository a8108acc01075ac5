//! Streaming multiplexer.
//!
//! Converts a correlation channel into an HTTP response body using one of
//! three framings, selected by the request's `Accept` header:
//!
//! - `application/x-ndjson`: chunks written as-is, error frames JSON-
//!   marshaled, one line each.
//! - `text/event-stream`: chunks as `data: ...` events; an error frame
//!   aborts the drain.
//! - anything else: raw passthrough; an error frame aborts the drain.
//!
//! The drain ends cleanly when the producer closes the channel. A client
//! disconnect drops the body stream mid-drain; the producer keeps running
//! and its remaining pushes drain into the abandoned channel.

use std::convert::Infallible;

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::Response;
use futures_util::StreamExt;
use futures_util::future;
use ggserve_engine::{StreamEvent, StreamReceiver};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// NDJSON content type.
pub const NDJSON: &str = "application/x-ndjson";
/// SSE content type.
pub const EVENT_STREAM: &str = "text/event-stream";

/// Build a streaming response for `receiver` framed according to `accept`.
pub fn stream_response(receiver: StreamReceiver, accept: Option<&str>) -> Response {
    match accept {
        Some(NDJSON) => ndjson_response(receiver),
        Some(EVENT_STREAM) => sse_response(receiver),
        _ => raw_response(receiver),
    }
}

fn ndjson_response(receiver: StreamReceiver) -> Response {
    let body = UnboundedReceiverStream::new(receiver).map(|event| {
        let line = match event {
            StreamEvent::Chunk(chunk) => chunk,
            StreamEvent::Error(message) => {
                serde_json::json!({ "error": message }).to_string()
            }
        };
        Ok::<String, Infallible>(format!("{line}\n"))
    });

    response_with_content_type(NDJSON, Body::from_stream(body))
}

fn sse_response(receiver: StreamReceiver) -> Response {
    let body = UnboundedReceiverStream::new(receiver).scan((), |_, event| {
        let frame = match event {
            StreamEvent::Chunk(chunk) => Some(Ok::<String, Infallible>(format!("data: {chunk}\n\n"))),
            StreamEvent::Error(message) => {
                tracing::warn!(%message, "aborting event stream on error frame");
                None
            }
        };
        future::ready(frame)
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, EVENT_STREAM)
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

fn raw_response(receiver: StreamReceiver) -> Response {
    let body = UnboundedReceiverStream::new(receiver).scan((), |_, event| {
        let frame = match event {
            StreamEvent::Chunk(chunk) => Some(Ok::<String, Infallible>(chunk)),
            StreamEvent::Error(message) => {
                tracing::warn!(%message, "aborting raw stream on error frame");
                None
            }
        };
        future::ready(frame)
    });

    Response::new(Body::from_stream(body))
}

fn response_with_content_type(content_type: &str, body: Body) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(body)
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

/// Drain the channel fully, concatenating chunk payloads.
///
/// Error frames are ignored; the caller treats an empty result as "no
/// content" and parses anything else as a JSON document.
pub async fn collect(mut receiver: StreamReceiver) -> String {
    let mut content = String::new();
    while let Some(event) = receiver.recv().await {
        match event {
            StreamEvent::Chunk(chunk) => content.push_str(&chunk),
            StreamEvent::Error(message) => {
                tracing::debug!(%message, "ignoring error frame while collecting");
            }
        }
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tokio::sync::mpsc;

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn ndjson_writes_chunk_plus_newline() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(StreamEvent::Chunk("foo".to_string())).unwrap();
        drop(tx);

        let response = stream_response(rx, Some(NDJSON));
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            NDJSON
        );
        assert_eq!(body_string(response).await, "foo\n");
    }

    #[tokio::test]
    async fn ndjson_marshals_error_frames() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(StreamEvent::Chunk("partial".to_string())).unwrap();
        tx.send(StreamEvent::Error("boom".to_string())).unwrap();
        drop(tx);

        let body = body_string(stream_response(rx, Some(NDJSON))).await;
        assert_eq!(body, "partial\n{\"error\":\"boom\"}\n");
    }

    #[tokio::test]
    async fn sse_frames_chunks_as_data_events() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(StreamEvent::Chunk("hello".to_string())).unwrap();
        tx.send(StreamEvent::Chunk("world".to_string())).unwrap();
        drop(tx);

        let response = stream_response(rx, Some(EVENT_STREAM));
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            EVENT_STREAM
        );
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-cache"
        );
        assert_eq!(
            body_string(response).await,
            "data: hello\n\ndata: world\n\n"
        );
    }

    #[tokio::test]
    async fn sse_aborts_on_error_frame() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(StreamEvent::Chunk("ok".to_string())).unwrap();
        tx.send(StreamEvent::Error("boom".to_string())).unwrap();
        tx.send(StreamEvent::Chunk("never".to_string())).unwrap();
        drop(tx);

        assert_eq!(body_string(stream_response(rx, Some(EVENT_STREAM))).await, "data: ok\n\n");
    }

    #[tokio::test]
    async fn default_framing_is_raw_passthrough() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(StreamEvent::Chunk("a".to_string())).unwrap();
        tx.send(StreamEvent::Chunk("b".to_string())).unwrap();
        drop(tx);

        assert_eq!(body_string(stream_response(rx, None)).await, "ab");
    }

    #[tokio::test]
    async fn collect_concatenates_and_ignores_errors() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(StreamEvent::Chunk("{\"done\":".to_string())).unwrap();
        tx.send(StreamEvent::Error("ignored".to_string())).unwrap();
        tx.send(StreamEvent::Chunk("true}".to_string())).unwrap();
        drop(tx);

        assert_eq!(collect(rx).await, "{\"done\":true}");
    }

    #[tokio::test]
    async fn collect_on_closed_channel_is_empty() {
        let (tx, rx) = mpsc::unbounded_channel::<StreamEvent>();
        drop(tx);
        assert_eq!(collect(rx).await, "");
    }
}
