use crate::core::models::{DisplayNameMap, Message, RoomEvent};

/// Opening line placed before the transcript.
pub const INTRO_PROMPT: &str = "Voici la transcription d'un chat avec mes amis:";

/// Instructions appended after the transcript.
pub const INSTRUCTIONS_PROMPT: &str = "Give a bullet-point summary that is detailed, thorough, and that accurately captures the conversation. Include names only to tell me who's backing up a claim or assertion. After reading your summary, my understanding of what happened should be as good as if I had read the messages myself. Give me details and specifics. Use active voice throughout. Only include links that would be genuinely useful for me to have. Write only the summary, without including text like \"Here's the summary\" or \"I hope this helped\". Be short, concise, and to the point. Reduce useless informations if possible. Say it in french.";

/// Projects room events onto prompt messages.
///
/// Events without a textual `body` (redactions, stickers without caption,
/// malformed content) are skipped. Order is kept as delivered.
#[must_use]
pub fn process_messages(events: &[RoomEvent]) -> Vec<Message> {
    events
        .iter()
        .filter_map(|event| {
            let body = event.content.get("body")?.as_str()?;
            Some(Message {
                user: event.sender.clone(),
                content: body.to_string(),
            })
        })
        .collect()
}

/// Resolves the name shown for a sender, falling back to the raw id.
#[must_use]
pub fn display_name<'a>(display_names: &'a DisplayNameMap, user: &'a str) -> &'a str {
    display_names
        .get(user)
        .map(String::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(user)
}

/// Renders the summarization prompt for a transcript.
#[must_use]
pub fn generate_prompt(messages: &[Message], display_names: &DisplayNameMap) -> String {
    let mut transcript = String::new();
    for message in messages {
        transcript.push('\n');
        transcript.push_str(display_name(display_names, &message.user));
        transcript.push_str(": ");
        transcript.push_str(&message.content);
    }

    format!("{INTRO_PROMPT}\n\n{transcript}\n\n{INSTRUCTIONS_PROMPT}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(id: &str, sender: &str, content: serde_json::Value) -> RoomEvent {
        RoomEvent {
            event_id: id.to_string(),
            sender: sender.to_string(),
            event_type: "m.room.message".to_string(),
            content,
            origin_server_ts: None,
            state_key: None,
        }
    }

    #[test]
    fn test_process_messages_skips_events_without_body() {
        let events = vec![
            event("$1", "@a:hs", json!({"msgtype": "m.text", "body": "salut"})),
            event("$2", "@b:hs", json!({})),
            event("$3", "@b:hs", json!({"body": 42})),
            event("$4", "@c:hs", json!({"msgtype": "m.notice", "body": "ok"})),
        ];

        let messages = process_messages(&events);

        assert_eq!(
            messages,
            vec![
                Message {
                    user: "@a:hs".to_string(),
                    content: "salut".to_string()
                },
                Message {
                    user: "@c:hs".to_string(),
                    content: "ok".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_generate_prompt_layout() {
        let messages = vec![Message {
            user: "@a:hs".to_string(),
            content: "hello".to_string(),
        }];
        let names = DisplayNameMap::from([("@a:hs".to_string(), "Alice".to_string())]);

        let prompt = generate_prompt(&messages, &names);

        assert_eq!(
            prompt,
            format!("{INTRO_PROMPT}\n\n\nAlice: hello\n\n{INSTRUCTIONS_PROMPT}")
        );
    }

    #[test]
    fn test_empty_display_name_falls_back_to_sender() {
        let names = DisplayNameMap::from([("@a:hs".to_string(), String::new())]);
        assert_eq!(display_name(&names, "@a:hs"), "@a:hs");
    }
}
