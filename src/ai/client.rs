//! Completion provider seam.
//!
//! Both upstream APIs present the same capability to the relay: take a
//! prompt, return a stream of text chunks.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use tracing::{error, info};

use super::anthropic::AnthropicProvider;
use super::openai::OpenAiProvider;
use super::stream::{ByteStream, TextStream};
use crate::core::config::{AppConfig, ProviderKind};
use crate::errors::RecapError;

/// Streaming completion capability shared by every provider.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Starts a streaming completion for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns [`RecapError::ConfigError`] when the provider credential is
    /// missing (no request is sent), and provider or HTTP errors when the
    /// upstream call fails before streaming starts.
    async fn stream_completion(&self, prompt: &str) -> Result<TextStream, RecapError>;
}

/// Selects the provider named by the configuration.
#[must_use]
pub fn build_provider(config: &AppConfig, http: Client) -> Arc<dyn CompletionProvider> {
    match config.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(http, config.openai.clone())),
        ProviderKind::Anthropic => {
            Arc::new(AnthropicProvider::new(http, config.anthropic.clone()))
        }
    }
}

/// Returns the credential or a configuration error naming the variable.
pub(crate) fn require_credential(
    kind: ProviderKind,
    api_key: Option<&String>,
) -> Result<String, RecapError> {
    api_key
        .filter(|key| !key.trim().is_empty())
        .cloned()
        .ok_or_else(|| RecapError::ConfigError(format!("{} is not defined", kind.credential_var())))
}

/// Sends a streaming request and hands back the body once headers arrive.
///
/// Non-success statuses are not retried; the upstream body is logged and the
/// caller gets a provider error carrying the status.
pub(crate) async fn send_streaming_request(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<ByteStream, RecapError> {
    let response = request
        .send()
        .await
        .map_err(|e| RecapError::HttpError(format!("{provider} streaming request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_else(|e| {
            format!("Failed to read error response body (status {status}): {e}")
        });
        error!(provider, status = status.as_u16(), body = %error_text, "Provider rejected completion request");
        return Err(RecapError::ProviderError(format!(
            "{provider} API error (status {status})"
        )));
    }

    info!(provider, status = status.as_u16(), "Provider stream opened");
    Ok(Box::pin(response.bytes_stream()))
}
