//! Anthropic legacy text-completions provider (`/v1/complete`).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

use super::client::{CompletionProvider, require_credential, send_streaming_request};
use super::sse::{ParseResult, SseFrame, StreamEvent};
use super::stream::{ProviderStream, TextStream};
use crate::core::config::{AnthropicSettings, ProviderKind};
use crate::errors::RecapError;

const PROVIDER_NAME: &str = "anthropic";
const COMPLETE_PATH: &str = "/v1/complete";
const API_VERSION: &str = "2023-06-01";

/// Wraps the prompt in the Human/Assistant turn template the API requires.
#[must_use]
pub fn wrap_prompt(prompt: &str) -> String {
    format!("\n\nHuman: {prompt}\n\nAssistant:")
}

pub struct AnthropicProvider {
    http: Client,
    settings: AnthropicSettings,
}

impl AnthropicProvider {
    #[must_use]
    pub fn new(http: Client, settings: AnthropicSettings) -> Self {
        Self { http, settings }
    }

    #[must_use]
    pub fn build_request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.settings.model,
            "max_tokens_to_sample": self.settings.max_tokens,
            "temperature": 0,
            "prompt": wrap_prompt(prompt),
            "stream": true
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{COMPLETE_PATH}",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn stream_completion(&self, prompt: &str) -> Result<TextStream, RecapError> {
        let api_key =
            require_credential(ProviderKind::Anthropic, self.settings.api_key.as_ref())?;

        info!(
            model = %self.settings.model,
            max_tokens = self.settings.max_tokens,
            prompt_chars = prompt.chars().count(),
            "Requesting Anthropic streaming completion"
        );

        let request = self
            .http
            .post(self.endpoint())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.build_request_body(prompt));

        let byte_stream = send_streaming_request(PROVIDER_NAME, request).await?;
        Ok(ProviderStream::new(PROVIDER_NAME, byte_stream, decode_frame).into_text_stream())
    }
}

/// Decodes one legacy completion stream frame.
///
/// `completion` events carry text and finish the stream once `stop_reason`
/// is set; `ping` is a keep-alive; `error` fails the stream.
#[must_use]
pub fn decode_frame(frame: &SseFrame) -> Vec<ParseResult> {
    let json: Value = match serde_json::from_str(&frame.data) {
        Ok(v) => v,
        Err(e) => {
            return vec![ParseResult::Event(StreamEvent::Failed(format!(
                "malformed stream payload: {e}"
            )))];
        }
    };

    let event_type = json
        .get("type")
        .and_then(Value::as_str)
        .or(frame.event.as_deref())
        .unwrap_or("");

    match event_type {
        "completion" => {
            let mut results = Vec::with_capacity(2);
            if let Some(text) = json.get("completion").and_then(Value::as_str)
                && !text.is_empty()
            {
                results.push(ParseResult::Event(StreamEvent::TextDelta(text.to_string())));
            }
            if json.get("stop_reason").is_some_and(|reason| !reason.is_null()) {
                results.push(ParseResult::Event(StreamEvent::Completed));
            }
            results
        }
        "ping" => Vec::new(),
        "error" => {
            let message = json
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            vec![ParseResult::Event(StreamEvent::Failed(message.to_string()))]
        }
        other => vec![ParseResult::UnknownEvent(other.to_string())],
    }
}
