//! `OpenAI` chat-completions provider.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

use super::client::{CompletionProvider, require_credential, send_streaming_request};
use super::sse::{ParseResult, SseFrame, StreamEvent};
use super::stream::{ProviderStream, TextStream};
use crate::core::config::{OpenAiSettings, ProviderKind};
use crate::errors::RecapError;

const PROVIDER_NAME: &str = "openai";
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Wraps the prompt in the turn-taking template sent as the user message.
#[must_use]
pub fn wrap_prompt(prompt: &str) -> String {
    format!("Human: {prompt}\n\nAssistant:")
}

pub struct OpenAiProvider {
    http: Client,
    settings: OpenAiSettings,
}

impl OpenAiProvider {
    #[must_use]
    pub fn new(http: Client, settings: OpenAiSettings) -> Self {
        Self { http, settings }
    }

    #[must_use]
    pub fn build_request_body(&self, prompt: &str) -> Value {
        let message = ChatCompletionMessage {
            role: MessageRole::user,
            content: Content::Text(wrap_prompt(prompt)),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        };

        json!({
            "model": self.settings.model,
            "messages": [message],
            "stream": true
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{CHAT_COMPLETIONS_PATH}",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn stream_completion(&self, prompt: &str) -> Result<TextStream, RecapError> {
        let api_key = require_credential(ProviderKind::OpenAi, self.settings.api_key.as_ref())?;

        #[cfg(feature = "debug-logs")]
        info!("Using OpenAI prompt:\n{}", prompt);

        #[cfg(not(feature = "debug-logs"))]
        info!(
            model = %self.settings.model,
            prompt_chars = prompt.chars().count(),
            "Requesting OpenAI streaming completion"
        );

        let mut request = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&self.build_request_body(prompt));

        if let Some(org) = &self.settings.org_id {
            request = request.header("OpenAI-Organization", org);
        }

        let byte_stream = send_streaming_request(PROVIDER_NAME, request).await?;
        Ok(ProviderStream::new(PROVIDER_NAME, byte_stream, decode_frame).into_text_stream())
    }
}

/// Decodes one `chat.completion.chunk` frame.
///
/// Role headers and `finish_reason` chunks carry no text and produce no
/// results; the stream ends on `[DONE]`.
#[must_use]
pub fn decode_frame(frame: &SseFrame) -> Vec<ParseResult> {
    if frame.is_done() {
        return vec![ParseResult::Done];
    }

    let json: Value = match serde_json::from_str(&frame.data) {
        Ok(v) => v,
        Err(e) => {
            return vec![ParseResult::Event(StreamEvent::Failed(format!(
                "malformed stream payload: {e}"
            )))];
        }
    };

    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| error.as_str())
            .unwrap_or("Unknown error");
        return vec![ParseResult::Event(StreamEvent::Failed(message.to_string()))];
    }

    let Some(choice) = json
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
    else {
        let object = json.get("object").and_then(Value::as_str).unwrap_or("unknown");
        return vec![ParseResult::UnknownEvent(object.to_string())];
    };

    match choice
        .get("delta")
        .and_then(|delta| delta.get("content"))
        .and_then(Value::as_str)
    {
        Some(text) => vec![ParseResult::Event(StreamEvent::TextDelta(text.to_string()))],
        None => Vec::new(),
    }
}
