#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use recap::core::models::{ReceiveOptions, RoomAccountData, RoomEvent};
use recap::errors::RecapError;
use recap::matrix::RoomEventSource;
use serde_json::json;

pub fn message(id: &str, sender: &str, body: &str) -> RoomEvent {
    RoomEvent {
        event_id: id.to_string(),
        sender: sender.to_string(),
        event_type: "m.room.message".to_string(),
        content: json!({"msgtype": "m.text", "body": body}),
        origin_server_ts: Some(1_700_000_000_000),
        state_key: None,
    }
}

pub fn member(user: &str, displayname: Option<&str>) -> RoomEvent {
    RoomEvent {
        event_id: format!("$member-{user}"),
        sender: user.to_string(),
        event_type: "m.room.member".to_string(),
        content: match displayname {
            Some(name) => json!({"membership": "join", "displayname": name}),
            None => json!({"membership": "join"}),
        },
        origin_server_ts: None,
        state_key: Some(user.to_string()),
    }
}

/// In-memory room recording the queries made against it.
#[derive(Default)]
pub struct FakeRoom {
    pub messages: Vec<RoomEvent>,
    pub members: Vec<RoomEvent>,
    pub fully_read: Option<String>,
    pub fail_messages: bool,
    pub queries: Mutex<Vec<ReceiveOptions>>,
}

impl FakeRoom {
    pub fn queries(&self) -> Vec<ReceiveOptions> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoomEventSource for FakeRoom {
    async fn receive_room_events(
        &self,
        event_type: &str,
        options: &ReceiveOptions,
    ) -> Result<Vec<RoomEvent>, RecapError> {
        self.queries.lock().unwrap().push(options.clone());
        if self.fail_messages {
            return Err(RecapError::PlatformError("homeserver unreachable".to_string()));
        }

        let start = options
            .since
            .as_ref()
            .and_then(|since| self.messages.iter().position(|e| &e.event_id == since))
            .map_or(0, |pos| pos + 1);
        let matching: Vec<RoomEvent> = self.messages[start..]
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect();
        let limit = options.limit.map_or(matching.len(), |l| l as usize);
        let skip = matching.len().saturating_sub(limit);

        Ok(matching.into_iter().skip(skip).collect())
    }

    async fn receive_room_account_data(
        &self,
        event_type: &str,
    ) -> Result<Vec<RoomAccountData>, RecapError> {
        Ok(self
            .fully_read
            .iter()
            .map(|event_id| RoomAccountData {
                event_type: event_type.to_string(),
                room_id: "!room:example.org".to_string(),
                content: json!({ "event_id": event_id }),
            })
            .collect())
    }

    async fn receive_state_events(&self, event_type: &str) -> Result<Vec<RoomEvent>, RecapError> {
        Ok(self
            .members
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect())
    }
}
