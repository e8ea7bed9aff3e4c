use std::num::ParseIntError;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use recap::matrix::MatrixClient;
use recap::utils::http_client;
use recap::widget::{RelayClient, SummaryWidget, ViewState, WidgetCommand, render};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "recap-widget")]
#[command(about = "Summarize the unread messages of a Matrix room", long_about = None)]
struct WidgetArgs {
    /// Homeserver base URL
    #[arg(long, env = "MATRIX_HOMESERVER")]
    homeserver: String,

    /// Access token of the reading user
    #[arg(long, env = "MATRIX_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    /// Fully-qualified user id, e.g. @me:example.org
    #[arg(long, env = "MATRIX_USER_ID")]
    user_id: String,

    /// Room to summarize
    #[arg(long, env = "MATRIX_ROOM_ID")]
    room_id: String,

    /// Base URL of a running recap-relay
    #[arg(long, env = "RECAP_RELAY_URL", default_value = "http://localhost:3000")]
    relay_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = WidgetArgs::parse();
    info!(room_id = %args.room_id, relay_url = %args.relay_url, "Starting recap widget");

    let http = http_client()?;
    let room = MatrixClient::new(
        http.clone(),
        &args.homeserver,
        args.access_token,
        args.user_id,
        args.room_id,
    )?;
    let relay = RelayClient::new(http, &args.relay_url)?;

    let widget = Arc::new(SummaryWidget::new(room, relay));
    let mut states = widget.subscribe();
    let (commands, command_rx) = mpsc::channel(8);
    let mut runner = tokio::spawn({
        let widget = Arc::clone(&widget);
        async move { widget.run(command_rx).await }
    });

    let mut stdout = tokio::io::stdout();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut screen = Screen::default();

    // The unread summary starts on mount; wait for it to settle.
    let mut state = ViewState::Idle;
    while state == ViewState::Idle || state.is_busy() {
        if states.changed().await.is_err() {
            break;
        }
        state = states.borrow_and_update().clone();
        show(&mut stdout, &mut screen, &state).await?;
    }

    let mut asked_recent = false;
    if let ViewState::NoMessages { count } = state {
        stdout
            .write_all(format!("\nHow many recent messages? [{count}, q to quit] ").as_bytes())
            .await?;
        stdout.flush().await?;

        let line = stdin.next_line().await?;
        let answer = parse_count_answer(line.as_deref()).unwrap_or_else(|e| {
            warn!(error = %e, "Not a number; keeping {count}");
            CountAnswer::Keep
        });
        if answer != CountAnswer::Quit {
            if let CountAnswer::Set(requested) = answer {
                commands.send(WidgetCommand::SetCount(requested)).await?;
            }
            commands.send(WidgetCommand::SummarizeRecent).await?;
            asked_recent = true;
            stdout.write_all(b"\n").await?;
            screen.new_line();
        }
    }

    // The runner exits once the queued commands are done.
    drop(commands);
    loop {
        tokio::select! {
            joined = &mut runner => {
                joined.context("widget task panicked")?;
                break;
            }
            changed = states.changed() => {
                if changed.is_err() {
                    (&mut runner).await.context("widget task panicked")?;
                    break;
                }
                let state = states.borrow_and_update().clone();
                show(&mut stdout, &mut screen, &state).await?;
            }
        }
    }

    let last = widget.state();
    show(&mut stdout, &mut screen, &last).await?;
    if asked_recent && matches!(last, ViewState::NoMessages { .. }) {
        stdout.write_all(b"\nNo messages in this room.").await?;
    }
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;

    match last {
        ViewState::Error(message) => Err(anyhow::anyhow!(message)),
        _ => Ok(()),
    }
}

/// Terminal rendering of successive view states.
#[derive(Debug, Default)]
struct Screen {
    shown: String,
}

impl Screen {
    /// Returns what to print to go from the last rendered text to `text`.
    fn update(&mut self, text: String) -> String {
        // Streamed text only grows, so print just the new tail.
        let output = match text.strip_prefix(self.shown.as_str()) {
            Some(tail) if !self.shown.is_empty() => tail.to_string(),
            _ if self.shown.is_empty() => text.clone(),
            _ => format!("\n{text}"),
        };
        self.shown = text;
        output
    }

    fn new_line(&mut self) {
        self.shown.clear();
    }
}

async fn show(stdout: &mut Stdout, screen: &mut Screen, state: &ViewState) -> std::io::Result<()> {
    let output = screen.update(render(state));
    stdout.write_all(output.as_bytes()).await?;
    stdout.flush().await
}

#[derive(Debug, PartialEq, Eq)]
enum CountAnswer {
    Quit,
    Keep,
    Set(u32),
}

/// Reads the answer to the recent-count question; end of input quits.
fn parse_count_answer(line: Option<&str>) -> Result<CountAnswer, ParseIntError> {
    let Some(answer) = line.map(str::trim) else {
        return Ok(CountAnswer::Quit);
    };
    if answer.eq_ignore_ascii_case("q") {
        return Ok(CountAnswer::Quit);
    }
    if answer.is_empty() {
        return Ok(CountAnswer::Keep);
    }
    answer.parse().map(CountAnswer::Set)
}
