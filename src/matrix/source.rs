use async_trait::async_trait;

use crate::core::models::{ReceiveOptions, RoomAccountData, RoomEvent};
use crate::errors::RecapError;

/// Read access to one room on the host messaging platform.
///
/// Events are returned oldest first, in the order the platform delivered
/// them.
#[async_trait]
pub trait RoomEventSource: Send + Sync {
    /// Room events of `event_type`, at most `options.limit` of them, and only
    /// those after `options.since` when a cursor is given.
    async fn receive_room_events(
        &self,
        event_type: &str,
        options: &ReceiveOptions,
    ) -> Result<Vec<RoomEvent>, RecapError>;

    /// Room account data entries of `event_type` for the current user.
    async fn receive_room_account_data(
        &self,
        event_type: &str,
    ) -> Result<Vec<RoomAccountData>, RecapError>;

    /// Current room state events of `event_type`.
    async fn receive_state_events(&self, event_type: &str) -> Result<Vec<RoomEvent>, RecapError>;
}
