//! Matrix client-server API access for a single room.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::source::RoomEventSource;
use crate::core::models::{ReceiveOptions, RoomAccountData, RoomEvent};
use crate::errors::RecapError;

/// Events requested per `/messages` page.
const MESSAGES_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    chunk: Vec<RoomEvent>,
    #[serde(default)]
    end: Option<String>,
}

/// Reads events from one room of a Matrix homeserver on behalf of a user.
#[derive(Debug, Clone)]
pub struct MatrixClient {
    http: Client,
    homeserver: Url,
    access_token: String,
    user_id: String,
    room_id: String,
}

impl MatrixClient {
    /// # Errors
    ///
    /// Returns a configuration error if `homeserver` is not an absolute URL.
    pub fn new(
        http: Client,
        homeserver: &str,
        access_token: String,
        user_id: String,
        room_id: String,
    ) -> Result<Self, RecapError> {
        let homeserver = Url::parse(homeserver)
            .map_err(|e| RecapError::ConfigError(format!("invalid homeserver URL: {e}")))?;

        Ok(Self {
            http,
            homeserver,
            access_token,
            user_id,
            room_id,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/_matrix/client/v3{path}",
            self.homeserver.as_str().trim_end_matches('/')
        )
    }

    fn room_path(&self, suffix: &str) -> String {
        format!("/rooms/{}{suffix}", urlencoding::encode(&self.room_id))
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<Value>, RecapError> {
        let response = self
            .http
            .get(self.endpoint(path))
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| RecapError::HttpError(format!("Matrix request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), path, body = %body, "Matrix request rejected");
            return Err(RecapError::PlatformError(format!(
                "{path} returned status {status}"
            )));
        }

        let json = response
            .json::<Value>()
            .await
            .map_err(|e| RecapError::PlatformError(format!("invalid response from {path}: {e}")))?;
        Ok(Some(json))
    }
}

/// Collects up to `limit` events of `event_type` from newest-first pages,
/// stopping at the `since` event. Returns them oldest first.
///
/// `next_page` is called with the pagination token of the previous page.
pub(crate) async fn paginate_backwards<F, Fut>(
    event_type: &str,
    options: &ReceiveOptions,
    mut next_page: F,
) -> Result<Vec<RoomEvent>, RecapError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<(Vec<RoomEvent>, Option<String>), RecapError>>,
{
    let limit = options.limit.map_or(usize::MAX, |l| l as usize);
    let mut collected = Vec::new();
    let mut from: Option<String> = None;

    'pages: while collected.len() < limit {
        let (chunk, end) = next_page(from.take()).await?;
        if chunk.is_empty() {
            break;
        }

        for event in chunk {
            if options.since.as_deref() == Some(event.event_id.as_str()) {
                break 'pages;
            }
            if event.event_type == event_type {
                collected.push(event);
                if collected.len() >= limit {
                    break 'pages;
                }
            }
        }

        match end {
            Some(token) => from = Some(token),
            None => break,
        }
    }

    collected.reverse();
    Ok(collected)
}

#[async_trait]
impl RoomEventSource for MatrixClient {
    async fn receive_room_events(
        &self,
        event_type: &str,
        options: &ReceiveOptions,
    ) -> Result<Vec<RoomEvent>, RecapError> {
        let path = self.room_path("/messages");
        let page_size = options
            .limit
            .map_or(MESSAGES_PAGE_SIZE, |l| l.clamp(1, MESSAGES_PAGE_SIZE));

        let events = paginate_backwards(event_type, options, |from| {
            let path = path.clone();
            async move {
                let mut query = vec![("dir", "b".to_string()), ("limit", page_size.to_string())];
                if let Some(token) = from {
                    query.push(("from", token));
                }

                let Some(json) = self.get_json(&path, &query).await? else {
                    return Err(RecapError::PlatformError(format!(
                        "room {} not found",
                        self.room_id
                    )));
                };
                let page: MessagesResponse = serde_json::from_value(json)?;
                debug!(events = page.chunk.len(), "Fetched messages page");
                Ok((page.chunk, page.end))
            }
        })
        .await?;

        Ok(events)
    }

    async fn receive_room_account_data(
        &self,
        event_type: &str,
    ) -> Result<Vec<RoomAccountData>, RecapError> {
        let path = format!(
            "/user/{}/rooms/{}/account_data/{}",
            urlencoding::encode(&self.user_id),
            urlencoding::encode(&self.room_id),
            urlencoding::encode(event_type)
        );

        Ok(self
            .get_json(&path, &[])
            .await?
            .map(|content| RoomAccountData {
                event_type: event_type.to_string(),
                room_id: self.room_id.clone(),
                content,
            })
            .into_iter()
            .collect())
    }

    async fn receive_state_events(&self, event_type: &str) -> Result<Vec<RoomEvent>, RecapError> {
        let path = self.room_path("/state");
        let Some(json) = self.get_json(&path, &[]).await? else {
            return Ok(Vec::new());
        };

        let events: Vec<RoomEvent> = serde_json::from_value(json)?;
        Ok(events
            .into_iter()
            .filter(|event| event.event_type == event_type)
            .collect())
    }
}
