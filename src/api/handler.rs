//! Completion relay routes.
//!
//! - `POST /api/completion`: forwards `{ "prompt": ... }` to the configured
//!   provider and streams the generated text back as `text/plain`
//! - `GET /health`: liveness probe

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use super::helpers;
use crate::ai::CompletionProvider;
use crate::core::models::CompletionRequest;
use crate::errors::RecapError;

/// Shared, immutable relay state.
#[derive(Clone)]
pub struct RelayState {
    provider: Arc<dyn CompletionProvider>,
}

impl RelayState {
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

impl std::fmt::Debug for RelayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayState")
            .field("provider", &self.provider.name())
            .finish()
    }
}

/// Builds the relay router.
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/api/completion", post(completion))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Parses the relay request body.
///
/// # Errors
///
/// Returns [`RecapError::ParseError`] when the body is not a JSON object
/// with a string `prompt`.
pub fn parse_completion_request(body: &[u8]) -> Result<CompletionRequest, RecapError> {
    serde_json::from_slice(body)
        .map_err(|e| RecapError::ParseError(format!("invalid completion request: {e}")))
}

#[tracing::instrument(level = "info", skip(state, body), fields(provider = state.provider.name()))]
async fn completion(State(state): State<RelayState>, body: Bytes) -> Result<Response, RecapError> {
    let correlation_id = Uuid::new_v4();
    let request = parse_completion_request(&body).inspect_err(|e| {
        error!(%correlation_id, error = %e, "Rejected completion request");
    })?;

    info!(
        %correlation_id,
        prompt_chars = request.prompt.chars().count(),
        "Relaying completion request"
    );

    match state.provider.stream_completion(&request.prompt).await {
        Ok(stream) => Ok(helpers::text_stream_response(stream, correlation_id)),
        Err(e) => {
            error!(%correlation_id, error = %e, "Completion request failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_request() {
        let request = parse_completion_request(br#"{"prompt":"hello"}"#).unwrap();
        assert_eq!(request.prompt, "hello");
    }

    #[test]
    fn test_parse_completion_request_rejects_missing_prompt() {
        let err = parse_completion_request(br#"{"text":"hello"}"#).unwrap_err();
        assert!(matches!(err, RecapError::ParseError(_)));
        assert!(err.to_string().contains("prompt"));
    }

    #[test]
    fn test_parse_completion_request_rejects_non_json() {
        assert!(parse_completion_request(b"prompt=hello").is_err());
    }
}
