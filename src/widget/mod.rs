//! Presentation layer: view state, rendering, relay client and the
//! controller tying them to a room.

pub mod controller;
pub mod relay_client;
pub mod render;
pub mod state;

pub use controller::{SummaryWidget, WidgetCommand};
pub use relay_client::{CompletionService, RelayClient};
pub use render::render;
pub use state::ViewState;
