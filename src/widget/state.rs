//! View state of the summary widget.

/// Message count offered by the "summarize recent messages" prompt.
pub const DEFAULT_OVERRIDE_COUNT: u32 = 250;
pub const MIN_OVERRIDE_COUNT: u32 = 1;
pub const MAX_OVERRIDE_COUNT: u32 = 1000;

/// Clamps a user-entered message count to the accepted range.
#[must_use]
pub const fn clamp_count(count: u32) -> u32 {
    if count < MIN_OVERRIDE_COUNT {
        MIN_OVERRIDE_COUNT
    } else if count > MAX_OVERRIDE_COUNT {
        MAX_OVERRIDE_COUNT
    } else {
        count
    }
}

/// Everything the widget can show.
///
/// `Idle -> Loading -> (NoMessages | Summarizing) -> Done`, with `Error`
/// reachable from `Loading` and `Summarizing`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    NoMessages {
        count: u32,
    },
    Summarizing {
        message_count: usize,
        text: String,
    },
    Done {
        message_count: usize,
        text: String,
    },
    Error(String),
}

impl ViewState {
    /// `true` while a fetch or completion stream is in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, ViewState::Loading | ViewState::Summarizing { .. })
    }

    /// Appends a streamed chunk, leaving `Loading` on the first one.
    pub fn push_chunk(&mut self, message_count: usize, chunk: &str) {
        match self {
            ViewState::Summarizing { text, .. } => text.push_str(chunk),
            _ => {
                *self = ViewState::Summarizing {
                    message_count,
                    text: chunk.to_string(),
                };
            }
        }
    }

    /// Marks the stream as finished, keeping the accumulated text.
    pub fn finish(&mut self, message_count: usize) {
        let text = match std::mem::take(self) {
            ViewState::Summarizing { text, .. } => text,
            _ => String::new(),
        };
        *self = ViewState::Done {
            message_count,
            text,
        };
    }

    /// Updates the override count; ignored outside `NoMessages`.
    ///
    /// Returns `true` when the count was applied.
    pub fn set_count(&mut self, requested: u32) -> bool {
        if let ViewState::NoMessages { count } = self {
            *count = clamp_count(requested);
            true
        } else {
            false
        }
    }

    /// Count to use for a manual "recent messages" summary.
    #[must_use]
    pub const fn override_count(&self) -> u32 {
        match self {
            ViewState::NoMessages { count } => *count,
            _ => DEFAULT_OVERRIDE_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_count() {
        assert_eq!(clamp_count(0), 1);
        assert_eq!(clamp_count(250), 250);
        assert_eq!(clamp_count(5000), 1000);
    }

    #[test]
    fn test_first_chunk_leaves_loading() {
        let mut state = ViewState::Loading;
        state.push_chunk(3, "Bonjour");
        state.push_chunk(3, " le");
        state.push_chunk(3, " monde");

        assert_eq!(
            state,
            ViewState::Summarizing {
                message_count: 3,
                text: "Bonjour le monde".to_string()
            }
        );
        assert!(state.is_busy());
    }

    #[test]
    fn test_finish_keeps_text() {
        let mut state = ViewState::Summarizing {
            message_count: 2,
            text: "- point".to_string(),
        };
        state.finish(2);

        assert_eq!(
            state,
            ViewState::Done {
                message_count: 2,
                text: "- point".to_string()
            }
        );
        assert!(!state.is_busy());
    }

    #[test]
    fn test_set_count_only_applies_to_no_messages() {
        let mut state = ViewState::NoMessages {
            count: DEFAULT_OVERRIDE_COUNT,
        };
        assert!(state.set_count(2000));
        assert_eq!(state.override_count(), MAX_OVERRIDE_COUNT);

        let mut loading = ViewState::Loading;
        assert!(!loading.set_count(10));
        assert_eq!(loading, ViewState::Loading);
    }
}
