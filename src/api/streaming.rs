//! Server-Sent Events (SSE) passthrough for streaming chat completions.
//!
//! Upstream chunks are relayed as they arrive, in order and untouched. The
//! proxy never buffers the whole stream and never rewrites chunk contents.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};

/// Relay an upstream byte stream to the caller as `text/event-stream`.
///
/// A transport error mid-stream is logged and ends the caller's body with an
/// error, which closes the connection.
pub fn create_sse_stream<S, E>(upstream: S, model: String) -> Response
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    // Capture now: the body is polled after the request-id scope has ended
    let request_id = crate::core::get_request_id();

    let byte_stream = upstream.map(move |chunk| {
        chunk.map_err(|e| {
            tracing::error!(
                request_id = %request_id,
                model = %model,
                error = %e,
                "Upstream stream error"
            );
            std::io::Error::new(std::io::ErrorKind::Other, e)
        })
    });

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(byte_stream),
    )
        .into_response()
}

/// Relay a streaming upstream response.
pub fn relay_upstream_stream(response: reqwest::Response, model: String) -> Response {
    create_sse_stream(response.bytes_stream(), model)
}
