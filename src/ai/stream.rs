//! Turns a provider's SSE byte stream into a stream of text chunks.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::collections::{HashSet, VecDeque};
use std::pin::Pin;
use tracing::{debug, warn};

use super::sse::{ParseResult, SseFrame, SseParser, StreamEvent};
use crate::errors::RecapError;
use crate::utils::Utf8Decoder;

/// Raw body of a streaming HTTP response.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Uniform output of every provider: text chunks in arrival order.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, RecapError>> + Send>>;

/// Provider-specific translation of one SSE frame.
pub type FrameDecoder = fn(&SseFrame) -> Vec<ParseResult>;

/// An in-flight streaming completion.
pub struct ProviderStream {
    provider: &'static str,
    byte_stream: ByteStream,
    decoder: FrameDecoder,
    parser: SseParser,
    utf8: Utf8Decoder,
    pending_results: VecDeque<ParseResult>,
    unexpected_event_types: HashSet<String>,
    saw_any_text: bool,
    completed: bool,
}

impl std::fmt::Debug for ProviderStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderStream")
            .field("provider", &self.provider)
            .field("completed", &self.completed)
            .field("saw_any_text", &self.saw_any_text)
            .field("pending_results_len", &self.pending_results.len())
            .field("parser_buffer_len", &self.parser.remaining_buffer().len())
            .finish_non_exhaustive()
    }
}

impl ProviderStream {
    #[must_use]
    pub fn new(provider: &'static str, byte_stream: ByteStream, decoder: FrameDecoder) -> Self {
        Self {
            provider,
            byte_stream,
            decoder,
            parser: SseParser::new(),
            utf8: Utf8Decoder::new(),
            pending_results: VecDeque::new(),
            unexpected_event_types: HashSet::new(),
            saw_any_text: false,
            completed: false,
        }
    }

    fn drain_pending_results(&mut self) -> Option<StreamEvent> {
        while let Some(result) = self.pending_results.pop_front() {
            match result {
                ParseResult::Event(event) => {
                    match &event {
                        StreamEvent::Completed | StreamEvent::Failed(_) => self.completed = true,
                        StreamEvent::TextDelta(delta) => {
                            if !delta.is_empty() {
                                self.saw_any_text = true;
                            }
                        }
                    }
                    return Some(event);
                }
                ParseResult::Done => {
                    self.completed = true;
                    return Some(StreamEvent::Completed);
                }
                ParseResult::UnknownEvent(event_type) => {
                    if self.unexpected_event_types.insert(event_type.clone()) {
                        warn!(provider = self.provider, event_type = %event_type, "Unexpected stream event type");
                    } else {
                        debug!(provider = self.provider, event_type = %event_type, "Ignoring repeated stream event type");
                    }
                }
            }
        }

        None
    }

    fn feed_text(&mut self, text: &str) {
        for frame in self.parser.feed(text) {
            self.pending_results.extend((self.decoder)(&frame));
        }
    }

    /// Returns the next stream event, or `None` once the stream is finished.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the body fails, the body is not valid
    /// UTF-8, or the body ends before any text or completion signal.
    pub async fn next_event(&mut self) -> Result<Option<StreamEvent>, RecapError> {
        if self.completed {
            return Ok(None);
        }

        loop {
            // Drain first: one HTTP chunk may hold several frames.
            if let Some(event) = self.drain_pending_results() {
                return Ok(Some(event));
            }
            if self.completed {
                return Ok(None);
            }

            match self.byte_stream.next().await {
                Some(Ok(bytes)) => match self.utf8.push(&bytes) {
                    Ok(text) => self.feed_text(&text),
                    Err(e) => {
                        self.completed = true;
                        return Err(RecapError::ProviderError(format!(
                            "{} stream is not valid UTF-8: {e}",
                            self.provider
                        )));
                    }
                },
                Some(Err(e)) => {
                    self.completed = true;
                    return Err(RecapError::HttpError(format!(
                        "Error reading {} stream: {e}",
                        self.provider
                    )));
                }
                None => {
                    self.completed = true;
                    if let Err(e) = self.utf8.finish() {
                        return Err(RecapError::ProviderError(format!(
                            "{} stream is not valid UTF-8: {e}",
                            self.provider
                        )));
                    }
                    if self.saw_any_text {
                        warn!(
                            provider = self.provider,
                            "Stream closed without a completion signal; treating as completed"
                        );
                        return Ok(Some(StreamEvent::Completed));
                    }
                    return Err(RecapError::ProviderError(format!(
                        "{} stream ended before any completion was produced",
                        self.provider
                    )));
                }
            }
        }
    }

    /// Converts into a stream of non-empty text chunks.
    ///
    /// The stream ends after the completion signal, or after yielding a
    /// single error.
    #[must_use]
    pub fn into_text_stream(self) -> TextStream {
        Box::pin(futures::stream::unfold(Some(self), |state| async move {
            let Some(mut stream) = state else {
                return None;
            };

            loop {
                match stream.next_event().await {
                    Ok(Some(StreamEvent::TextDelta(delta))) => {
                        if delta.is_empty() {
                            continue;
                        }
                        return Some((Ok(delta), Some(stream)));
                    }
                    Ok(Some(StreamEvent::Completed) | None) => return None,
                    Ok(Some(StreamEvent::Failed(msg))) => {
                        let err = RecapError::ProviderError(format!(
                            "{} streaming failed: {msg}",
                            stream.provider
                        ));
                        return Some((Err(err), None));
                    }
                    Err(e) => return Some((Err(e), None)),
                }
            }
        }))
    }
}
