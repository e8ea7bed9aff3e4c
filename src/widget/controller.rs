//! Drives the widget: fetch, prompt, relay, publish state.

use futures::StreamExt;
use std::future::Future;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use super::relay_client::CompletionService;
use super::state::{DEFAULT_OVERRIDE_COUNT, ViewState};
use crate::errors::RecapError;
use crate::matrix::{RoomEventSource, fetch_messages};
use crate::prompt::generate_prompt;

/// Commands accepted by [`SummaryWidget::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetCommand {
    /// Summarize the messages after the user's read marker.
    SummarizeUnread,
    /// Summarize the most recent messages, using the count currently offered.
    SummarizeRecent,
    /// Change the offered count while showing "no new messages".
    SetCount(u32),
}

/// Summary widget bound to one room and one completion service.
pub struct SummaryWidget<S, C> {
    source: S,
    completions: C,
    state: watch::Sender<ViewState>,
}

impl<S, C> SummaryWidget<S, C>
where
    S: RoomEventSource,
    C: CompletionService,
{
    pub fn new(source: S, completions: C) -> Self {
        let (state, _) = watch::channel(ViewState::Idle);
        Self {
            source,
            completions,
            state,
        }
    }

    /// Receiver notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Fetches messages and streams their summary into the view state.
    ///
    /// An empty fetch ends in [`ViewState::NoMessages`] without calling the
    /// completion service, keeping the count offered before the call.
    /// Failures end in [`ViewState::Error`] and are also returned.
    ///
    /// # Errors
    ///
    /// Returns [`RecapError::Busy`] without touching the state if another
    /// summarization is in flight, or the fetch or completion error.
    pub async fn summarize(&self, only_unread: bool, limit: Option<u32>) -> Result<(), RecapError> {
        let mut offered = DEFAULT_OVERRIDE_COUNT;
        let started = self.state.send_if_modified(|state| {
            if state.is_busy() {
                return false;
            }
            offered = state.override_count();
            *state = ViewState::Loading;
            true
        });
        if !started {
            warn!("Summarization already in progress; request rejected");
            return Err(RecapError::Busy);
        }

        match self.stream_summary(only_unread, limit, offered).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(error = %e, "Summarization failed");
                self.state.send_replace(ViewState::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Summarizes the N most recent messages regardless of read state.
    ///
    /// # Errors
    ///
    /// Same as [`SummaryWidget::summarize`].
    pub async fn summarize_recent(&self) -> Result<(), RecapError> {
        let count = self.state.borrow().override_count();
        self.summarize(false, Some(count)).await
    }

    /// Changes the count offered by the "no new messages" prompt.
    pub fn set_count(&self, count: u32) {
        let applied = self.state.send_if_modified(|state| state.set_count(count));
        if !applied {
            debug!(count, "Ignoring count change outside the no-messages view");
        }
    }

    async fn stream_summary(
        &self,
        only_unread: bool,
        limit: Option<u32>,
        offered: u32,
    ) -> Result<(), RecapError> {
        let fetched = fetch_messages(&self.source, only_unread, limit).await?;
        if fetched.is_empty() {
            info!(only_unread, "No messages to summarize");
            self.state
                .send_replace(ViewState::NoMessages { count: offered });
            return Ok(());
        }

        let message_count = fetched.messages.len();
        let prompt = generate_prompt(&fetched.messages, &fetched.display_names);
        let mut stream = self.completions.complete(&prompt).await?;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            self.state
                .send_modify(|state| state.push_chunk(message_count, &chunk));
        }

        self.state.send_modify(|state| state.finish(message_count));
        info!(message_count, "Summary complete");
        Ok(())
    }

    /// Runs the widget until the command channel closes.
    ///
    /// An unread summarization starts immediately, as on mount. Summarize
    /// commands that arrive while one is in flight are logged and dropped.
    pub async fn run(&self, mut commands: mpsc::Receiver<WidgetCommand>) {
        let mut next = Some(WidgetCommand::SummarizeUnread);

        loop {
            let command = match next.take() {
                Some(command) => command,
                None => match commands.recv().await {
                    Some(command) => command,
                    None => break,
                },
            };

            let open = match command {
                WidgetCommand::SetCount(count) => {
                    self.set_count(count);
                    true
                }
                WidgetCommand::SummarizeUnread => {
                    self.drive(self.summarize(true, None), &mut commands).await
                }
                WidgetCommand::SummarizeRecent => {
                    self.drive(self.summarize_recent(), &mut commands).await
                }
            };
            if !open {
                break;
            }
        }
        debug!("Widget command channel closed");
    }

    /// Awaits `job` while draining commands that arrive in the meantime.
    ///
    /// Returns `false` if the command channel closed.
    async fn drive<F>(&self, job: F, commands: &mut mpsc::Receiver<WidgetCommand>) -> bool
    where
        F: Future<Output = Result<(), RecapError>>,
    {
        tokio::pin!(job);

        loop {
            tokio::select! {
                result = &mut job => {
                    // Failures are already reflected in the view state.
                    let _ = result;
                    return true;
                }
                command = commands.recv() => match command {
                    Some(command) => {
                        warn!(?command, "Summarization in progress; command ignored");
                    }
                    None => {
                        let _ = job.await;
                        return false;
                    }
                },
            }
        }
    }
}
