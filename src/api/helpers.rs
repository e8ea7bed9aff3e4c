//! Response builders shared by the relay handlers.

use axum::Json;
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::ai::TextStream;
use crate::errors::RecapError;

/// Content type of relayed completions.
pub const TEXT_STREAM_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

impl IntoResponse for RecapError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        err_response(status, &self.to_string())
    }
}

/// Relays a completion stream as a chunked `text/plain` body.
///
/// Chunks are forwarded as they arrive. A provider error after streaming
/// started aborts the body, which the client observes as a failed read.
#[must_use]
pub fn text_stream_response(stream: TextStream, correlation_id: Uuid) -> Response {
    let mut chunk_count: usize = 0;
    let logged = stream.inspect(move |item| match item {
        Ok(_) => {
            chunk_count += 1;
            if chunk_count == 1 {
                info!(%correlation_id, "First completion chunk relayed");
            }
        }
        Err(e) => {
            error!(%correlation_id, chunks = chunk_count, error = %e, "Completion stream aborted");
        }
    });

    (
        [(header::CONTENT_TYPE, TEXT_STREAM_CONTENT_TYPE)],
        Body::from_stream(logged),
    )
        .into_response()
}
