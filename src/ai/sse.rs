//! Server-Sent Events (SSE) framing for provider streaming responses.
//!
//! This module provides an SSE parser that handles:
//! - Frames split across TCP chunks
//! - Multiple frames in one read
//! - Comments and blank keep-alive frames (dropped)
//!
//! It knows nothing about provider payloads; each provider decodes the
//! frames it receives into [`ParseResult`]s.

/// Events a provider stream can produce once its payloads are decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A chunk of generated text.
    TextDelta(String),
    /// The provider signalled the end of the completion.
    Completed,
    /// The provider reported an error inside the stream.
    Failed(String),
}

/// Result of decoding one SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    /// A meaningful event was decoded.
    Event(StreamEvent),
    /// The frame was understood but carries nothing to relay (pings, role headers).
    UnknownEvent(String),
    /// End of stream signal (`[DONE]`).
    Done,
}

/// One complete SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, if any.
    pub event: Option<String>,
    /// Joined `data:` lines.
    pub data: String,
}

impl SseFrame {
    /// Returns `true` for the `[DONE]` sentinel used by chat-completion streams.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.data == "[DONE]"
    }
}

/// Stateful SSE parser that buffers incomplete frames across chunk boundaries.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
}

impl SseParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Feeds a chunk of data to the parser and returns all complete frames.
    pub fn feed(&mut self, chunk: &str) -> Vec<SseFrame> {
        self.buffer.push_str(chunk);
        let mut frames = Vec::new();

        while let Some(event_end) = self.find_event_boundary() {
            let event_text = self.buffer[..event_end].to_string();
            self.buffer = self.buffer[event_end..]
                .trim_start_matches(['\r', '\n'])
                .to_string();

            if let Some(frame) = Self::parse_frame(&event_text) {
                frames.push(frame);
            }
        }

        frames
    }

    /// Finds the end of the first complete frame, whichever line ending it uses.
    fn find_event_boundary(&self) -> Option<usize> {
        let lf = self.buffer.find("\n\n").map(|pos| pos + 2);
        let crlf = self.buffer.find("\r\n\r\n").map(|pos| pos + 4);
        match (lf, crlf) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn parse_frame(event_text: &str) -> Option<SseFrame> {
        let mut event = None;
        let mut data_lines: Vec<&str> = Vec::new();

        for line in event_text.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim();
                if !data.is_empty() {
                    data_lines.push(data);
                }
            } else if let Some(name) = line.strip_prefix("event:") {
                event = Some(name.trim().to_string());
            }
        }

        if data_lines.is_empty() {
            return None;
        }

        Some(SseFrame {
            event,
            data: data_lines.join("\n"),
        })
    }

    /// Returns any remaining buffered data.
    #[must_use]
    pub fn remaining_buffer(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_frame() {
        let mut parser = SseParser::new();
        let frames = parser.feed("data: {\"completion\":\"Hello\"}\n\n");

        assert_eq!(
            frames,
            vec![SseFrame {
                event: None,
                data: "{\"completion\":\"Hello\"}".to_string()
            }]
        );
    }

    #[test]
    fn test_event_name_is_kept() {
        let mut parser = SseParser::new();
        let frames = parser.feed("event: completion\ndata: {}\n\n");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("completion"));
    }

    #[test]
    fn test_done_signal() {
        let mut parser = SseParser::new();
        let frames = parser.feed("data: [DONE]\n\n");

        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_done());
    }

    #[test]
    fn test_multiple_frames_in_single_chunk() {
        let mut parser = SseParser::new();
        let frames = parser.feed(concat!(
            "data: {\"n\":1}\n\n",
            "data: {\"n\":2}\n\n",
            "data: [DONE]\n\n"
        ));

        let data: Vec<&str> = frames.iter().map(|f| f.data.as_str()).collect();
        assert_eq!(data, vec!["{\"n\":1}", "{\"n\":2}", "[DONE]"]);
    }

    #[test]
    fn test_frames_split_across_chunks() {
        let mut parser = SseParser::new();

        assert!(parser.feed("data: {\"completion\":").is_empty());
        assert!(parser.feed("\"Hi\"}\n").is_empty(), "waits for blank line");

        let frames = parser.feed("\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"completion\":\"Hi\"}");
        assert!(parser.remaining_buffer().is_empty());
    }

    #[test]
    fn test_comments_and_keepalives_are_dropped() {
        let mut parser = SseParser::new();
        let frames = parser.feed(": keep-alive\n\n\n\nevent: ping\n\ndata: {}\n\n");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{}");
        assert_eq!(frames[0].event, None);
    }

    #[test]
    fn test_windows_line_endings() {
        let mut parser = SseParser::new();
        let frames = parser.feed("event: completion\r\ndata: {\"a\":1}\r\n\r\ndata: {\"a\":2}\r\n\r\n");

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event.as_deref(), Some("completion"));
        assert_eq!(frames[1].data, "{\"a\":2}");
    }

    #[test]
    fn test_multi_line_data_is_joined() {
        let mut parser = SseParser::new();
        let frames = parser.feed("data: first\ndata: second\n\n");

        assert_eq!(frames[0].data, "first\nsecond");
    }

    #[test]
    fn test_fragmented_frame_across_many_chunks() {
        let mut parser = SseParser::new();
        let full = "event: completion\ndata: {\"completion\":\"Complete message here!\"}\n\n";

        let mut emitted = Vec::new();
        for chunk in full.as_bytes().chunks(5) {
            emitted.extend(parser.feed(std::str::from_utf8(chunk).unwrap()));
        }

        assert_eq!(emitted.len(), 1);
        assert_eq!(
            emitted[0].data,
            "{\"completion\":\"Complete message here!\"}"
        );
    }

    #[test]
    fn test_incomplete_frame_stays_buffered() {
        let mut parser = SseParser::new();
        assert!(parser.feed("data: {\"partial").is_empty());
        assert!(parser.remaining_buffer().contains("partial"));

        let frames = parser.feed("\": true}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"partial\": true}");
        assert!(parser.remaining_buffer().is_empty());
    }
}
