use serde_json::Value;
use tracing::{debug, info};

use super::source::RoomEventSource;
use crate::core::models::{
    DisplayNameMap, FULLY_READ_EVENT, Message, ROOM_MEMBER_EVENT, ROOM_MESSAGE_EVENT,
    ReceiveOptions, RoomEvent,
};
use crate::errors::RecapError;
use crate::prompt::process_messages;

/// Message cap used when the caller gives none.
pub const DEFAULT_FETCH_LIMIT: u32 = 500;

/// Messages and sender names gathered for one summarization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedMessages {
    pub messages: Vec<Message>,
    pub display_names: DisplayNameMap,
}

impl FetchedMessages {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Reads the event id of the user's fully-read marker, if one is stored.
///
/// # Errors
///
/// Returns an error if the platform call fails.
pub async fn fully_read_marker<S>(source: &S) -> Result<Option<String>, RecapError>
where
    S: RoomEventSource + ?Sized,
{
    let data = source.receive_room_account_data(FULLY_READ_EVENT).await?;
    Ok(data
        .first()
        .and_then(|entry| entry.event_id())
        .map(str::to_string))
}

/// Builds the sender to display-name map from room membership state.
///
/// Members without a display name are left out so callers fall back to the
/// raw sender id.
///
/// # Errors
///
/// Returns an error if the platform call fails.
pub async fn get_display_name_data<S>(source: &S) -> Result<DisplayNameMap, RecapError>
where
    S: RoomEventSource + ?Sized,
{
    let members = source.receive_state_events(ROOM_MEMBER_EVENT).await?;

    Ok(members
        .into_iter()
        .filter_map(|event| {
            let user = event.state_key?;
            let name = event
                .content
                .get("displayname")
                .and_then(Value::as_str)
                .filter(|name| !name.trim().is_empty())?
                .to_string();
            Some((user, name))
        })
        .collect())
}

/// Fetches the messages to summarize and the names of their senders.
///
/// With `only_unread`, the query starts after the fully-read marker; a room
/// with no stored marker is queried without a cursor. An empty result is
/// not an error.
///
/// # Errors
///
/// Returns an error if any platform call fails.
#[tracing::instrument(level = "info", skip(source))]
pub async fn fetch_messages<S>(
    source: &S,
    only_unread: bool,
    limit: Option<u32>,
) -> Result<FetchedMessages, RecapError>
where
    S: RoomEventSource + ?Sized,
{
    let limit = limit.unwrap_or(DEFAULT_FETCH_LIMIT);

    let since = if only_unread {
        let marker = fully_read_marker(source).await?;
        if marker.is_none() {
            debug!("No fully-read marker stored; fetching without cursor");
        }
        marker
    } else {
        None
    };

    let options = ReceiveOptions {
        limit: Some(limit),
        since,
    };
    let events = source
        .receive_room_events(ROOM_MESSAGE_EVENT, &options)
        .await?;

    let messages = process_messages(&events);
    let display_names = get_display_name_data(source).await?;

    info!(
        events = events.len(),
        messages = messages.len(),
        senders = display_names.len(),
        oldest = ?events.first().and_then(RoomEvent::origin_time),
        "Fetched room messages"
    );

    Ok(FetchedMessages {
        messages,
        display_names,
    })
}
