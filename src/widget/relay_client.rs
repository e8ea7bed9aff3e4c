//! Client side of the completion relay.

use async_trait::async_trait;
use futures::{StreamExt, stream};
use reqwest::Client;
use tracing::{error, info};
use url::Url;

use crate::ai::TextStream;
use crate::core::models::CompletionRequest;
use crate::errors::RecapError;
use crate::utils::Utf8Decoder;

/// Turns a prompt into a stream of generated text.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<TextStream, RecapError>;
}

/// Posts prompts to a running relay and streams its plain-text reply.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
    endpoint: Url,
}

impl RelayClient {
    /// # Errors
    ///
    /// Returns a configuration error if `relay_url` is not a valid base URL.
    pub fn new(http: Client, relay_url: &str) -> Result<Self, RecapError> {
        let base = format!("{}/", relay_url.trim_end_matches('/'));
        let endpoint = Url::parse(&base)
            .and_then(|base| base.join("api/completion"))
            .map_err(|e| RecapError::ConfigError(format!("invalid relay URL: {e}")))?;

        Ok(Self { http, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionService for RelayClient {
    async fn complete(&self, prompt: &str) -> Result<TextStream, RecapError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&CompletionRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await
            .map_err(|e| RecapError::HttpError(format!("relay request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Relay rejected completion request");
            return Err(RecapError::ProviderError(format!(
                "relay returned status {status}: {body}"
            )));
        }
        info!(status = status.as_u16(), "Relay stream opened");

        let body = response.bytes_stream().boxed();
        let text = stream::unfold(Some((body, Utf8Decoder::new())), |state| async move {
            let (mut body, mut decoder) = state?;
            loop {
                match body.next().await {
                    Some(Ok(bytes)) => match decoder.push(&bytes) {
                        Ok(text) if text.is_empty() => {}
                        Ok(text) => return Some((Ok(text), Some((body, decoder)))),
                        Err(e) => return Some((Err(RecapError::ParseError(e)), None)),
                    },
                    Some(Err(e)) => {
                        let err = RecapError::HttpError(format!("Error reading relay stream: {e}"));
                        return Some((Err(err), None));
                    }
                    None => {
                        return decoder
                            .finish()
                            .err()
                            .map(|e| (Err(RecapError::ParseError(e)), None));
                    }
                }
            }
        });

        Ok(Box::pin(text))
    }
}
