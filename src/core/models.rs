use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event type of chat messages on the host platform.
pub const ROOM_MESSAGE_EVENT: &str = "m.room.message";
/// Room account data type holding the user's read cursor.
pub const FULLY_READ_EVENT: &str = "m.fully_read";
/// State event type carrying per-member profile data.
pub const ROOM_MEMBER_EVENT: &str = "m.room.member";

/// A room event as delivered by the host platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomEvent {
    pub event_id: String,
    pub sender: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub origin_server_ts: Option<i64>,
    #[serde(default)]
    pub state_key: Option<String>,
}

impl RoomEvent {
    #[must_use]
    pub fn origin_time(&self) -> Option<DateTime<Utc>> {
        self.origin_server_ts
            .and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}

/// Room account data entry (for example the `m.fully_read` marker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomAccountData {
    #[serde(rename = "type")]
    pub event_type: String,
    pub room_id: String,
    #[serde(default)]
    pub content: Value,
}

impl RoomAccountData {
    /// Event id the marker points at, when the content carries one.
    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        self.content.get("event_id").and_then(Value::as_str)
    }
}

/// A chat message ready to be placed in a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub user: String,
    pub content: String,
}

/// Sender id to human-readable display name.
pub type DisplayNameMap = HashMap<String, String>;

/// Options for a room event query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiveOptions {
    pub limit: Option<u32>,
    pub since: Option<String>,
}

/// Body of `POST /api/completion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
}
