//! All LLM provider functionality

pub mod anthropic;
pub mod client;
pub mod openai;
pub mod sse;
pub mod stream;

// Re-export main types for convenience
pub use client::{CompletionProvider, build_provider};
pub use sse::{ParseResult, SseFrame, SseParser, StreamEvent};
pub use stream::{ProviderStream, TextStream};
