//! Matrix room access: event source seam, HTTP client and message fetching.

pub mod client;
pub mod fetch;
pub mod source;

pub use client::MatrixClient;
pub use fetch::{DEFAULT_FETCH_LIMIT, FetchedMessages, fetch_messages};
pub use source::RoomEventSource;
