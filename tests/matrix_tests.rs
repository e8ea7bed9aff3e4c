use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use recap::core::models::{FULLY_READ_EVENT, ROOM_MESSAGE_EVENT, ReceiveOptions};
use recap::errors::RecapError;
use recap::matrix::{MatrixClient, RoomEventSource, fetch_messages};
use serde_json::{Value, json};
use tokio::net::TcpListener;

const TOKEN: &str = "syt_secret";
const USER: &str = "@me:example.org";
const ROOM: &str = "!room:example.org";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn event(id: &str, kind: &str, sender: &str, body: &str) -> Value {
    json!({
        "event_id": id,
        "type": kind,
        "sender": sender,
        "origin_server_ts": 1_700_000_000_000_i64,
        "content": {"msgtype": "m.text", "body": body},
    })
}

async fn messages(
    Path(room): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"errcode": "M_UNKNOWN_TOKEN"})))
            .into_response();
    }
    assert_eq!(room, ROOM);
    assert_eq!(query.get("dir").map(String::as_str), Some("b"));

    // Newest first, two pages.
    let page = match query.get("from").map(String::as_str) {
        None => json!({
            "chunk": [
                event("$5", "m.room.message", "@bob:example.org", "Chez Paul"),
                event("$4", "m.reaction", "@me:example.org", ""),
                event("$3", "m.room.message", USER, "On dîne où ?"),
            ],
            "start": "t0",
            "end": "t1",
        }),
        Some("t1") => json!({
            "chunk": [
                event("$2", "m.room.message", "@bob:example.org", "lu"),
                event("$1", "m.room.message", "@bob:example.org", "très vieux"),
            ],
            "start": "t1",
        }),
        Some(other) => panic!("unexpected pagination token {other}"),
    };
    Json(page).into_response()
}

async fn account_data(Path((user, room, kind)): Path<(String, String, String)>) -> Response {
    if user != USER || room != ROOM || kind != FULLY_READ_EVENT {
        return (StatusCode::NOT_FOUND, Json(json!({"errcode": "M_NOT_FOUND"}))).into_response();
    }
    Json(json!({"event_id": "$2"})).into_response()
}

async fn state() -> Json<Value> {
    Json(json!([
        {
            "event_id": "$m1",
            "type": "m.room.member",
            "sender": USER,
            "state_key": USER,
            "content": {"membership": "join", "displayname": "Moi"},
        },
        {
            "event_id": "$m2",
            "type": "m.room.member",
            "sender": "@bob:example.org",
            "state_key": "@bob:example.org",
            "content": {"membership": "join", "displayname": "Bob"},
        },
        {
            "event_id": "$n",
            "type": "m.room.name",
            "sender": USER,
            "state_key": "",
            "content": {"name": "Amis"},
        },
    ]))
}

async fn spawn_homeserver() -> String {
    let app = Router::new()
        .route("/_matrix/client/v3/rooms/{room}/messages", get(messages))
        .route("/_matrix/client/v3/rooms/{room}/state", get(state))
        .route(
            "/_matrix/client/v3/user/{user}/rooms/{room}/account_data/{kind}",
            get(account_data),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(homeserver: &str, token: &str, user: &str) -> MatrixClient {
    MatrixClient::new(
        reqwest::Client::new(),
        homeserver,
        token.to_string(),
        user.to_string(),
        ROOM.to_string(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_messages_are_paged_until_marker() {
    let homeserver = spawn_homeserver().await;
    let client = client(&homeserver, TOKEN, USER);

    let events = client
        .receive_room_events(
            ROOM_MESSAGE_EVENT,
            &ReceiveOptions {
                limit: Some(500),
                since: Some("$2".to_string()),
            },
        )
        .await
        .unwrap();

    let ids: Vec<&str> = events.iter().map(|e| e.event_id.as_str()).collect();
    assert_eq!(ids, vec!["$3", "$5"]);
}

#[tokio::test]
async fn test_messages_without_cursor_read_whole_history() {
    let homeserver = spawn_homeserver().await;
    let client = client(&homeserver, TOKEN, USER);

    let events = client
        .receive_room_events(ROOM_MESSAGE_EVENT, &ReceiveOptions::default())
        .await
        .unwrap();

    let ids: Vec<&str> = events.iter().map(|e| e.event_id.as_str()).collect();
    assert_eq!(ids, vec!["$1", "$2", "$3", "$5"]);
}

#[tokio::test]
async fn test_fetch_unread_end_to_end() {
    let homeserver = spawn_homeserver().await;
    let client = client(&homeserver, TOKEN, USER);

    let fetched = fetch_messages(&client, true, None).await.unwrap();

    let contents: Vec<&str> = fetched.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["On dîne où ?", "Chez Paul"]);
    assert_eq!(fetched.display_names.get(USER).map(String::as_str), Some("Moi"));
    assert_eq!(
        fetched.display_names.get("@bob:example.org").map(String::as_str),
        Some("Bob")
    );
}

#[tokio::test]
async fn test_missing_account_data_means_no_marker() {
    let homeserver = spawn_homeserver().await;
    let client = client(&homeserver, TOKEN, "@other:example.org");

    let data = client
        .receive_room_account_data(FULLY_READ_EVENT)
        .await
        .unwrap();

    assert!(data.is_empty());
}

#[tokio::test]
async fn test_rejected_token_is_a_platform_error() {
    let homeserver = spawn_homeserver().await;
    let client = client(&homeserver, "wrong", USER);

    let err = client
        .receive_room_events(ROOM_MESSAGE_EVENT, &ReceiveOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RecapError::PlatformError(_)));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_state_events_are_filtered_by_type() {
    let homeserver = spawn_homeserver().await;
    let client = client(&homeserver, TOKEN, USER);

    let members = client.receive_state_events("m.room.member").await.unwrap();

    assert_eq!(members.len(), 2);
    assert!(members.iter().all(|e| e.state_key.is_some()));
}
