use super::state::ViewState;

pub const LOADING_TEXT: &str = "Computing...";
pub const NO_MESSAGES_TEXT: &str = "No new messages.";
pub const OVERRIDE_PROMPT_TEXT: &str = "Summarize recent messages?";

/// Visible text for a widget state.
#[must_use]
pub fn render(state: &ViewState) -> String {
    match state {
        ViewState::Idle => String::new(),
        ViewState::Loading => LOADING_TEXT.to_string(),
        ViewState::NoMessages { count } => {
            format!("{NO_MESSAGES_TEXT}\n{OVERRIDE_PROMPT_TEXT} [{count}]")
        }
        ViewState::Summarizing {
            message_count,
            text,
        }
        | ViewState::Done {
            message_count,
            text,
        } => format!("{message_count} messages:\n{text}"),
        ViewState::Error(message) => message.clone(),
    }
}
