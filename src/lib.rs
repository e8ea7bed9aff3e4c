/// Recap - summarizes recent chat messages of a Matrix room with an LLM.
///
/// The crate has two halves joined by one HTTP hop:
/// 1. A completion relay (`recap-relay`) that accepts a prompt and streams
///    the provider's answer back as plain text
/// 2. A widget (`recap-widget`) that fetches room messages, builds the prompt
///    and renders the streamed summary as it arrives
///
/// # Architecture
///
/// - `matrix` reads room history, the fully-read marker and display names
/// - `prompt` renders the fixed summarization prompt
/// - `ai` talks to OpenAI or Anthropic and decodes their SSE streams
/// - `api` exposes the relay over axum
/// - `widget` holds the view state machine and its controller
///
/// # Example
///
/// ```no_run
/// use recap::matrix::MatrixClient;
/// use recap::widget::{RelayClient, SummaryWidget, render};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let http = recap::utils::http_client()?;
///     let room = MatrixClient::new(
///         http.clone(),
///         "https://matrix.example.org",
///         "syt_token".to_string(),
///         "@me:example.org".to_string(),
///         "!room:example.org".to_string(),
///     )?;
///     let relay = RelayClient::new(http, "http://localhost:3000")?;
///
///     let widget = SummaryWidget::new(room, relay);
///     widget.summarize(true, None).await?;
///     println!("{}", render(&widget.state()));
///
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod api;
pub mod core;
pub mod errors;
pub mod matrix;
pub mod prompt;
pub mod utils;
pub mod widget;

/// Configure structured JSON logging for the relay.
///
/// The level is taken from `RUST_LOG`, defaulting to `info`. Calling it more
/// than once keeps the first subscriber.
///
/// # Example
///
/// ```
/// recap::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
