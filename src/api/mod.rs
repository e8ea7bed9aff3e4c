//! HTTP surface of the completion relay.

pub mod handler;
pub mod helpers;
pub mod server;

pub use handler::{RelayState, router};
