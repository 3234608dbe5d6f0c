//! High-level async client for airhub controllers.
//!
//! [`ControllerClient`] wraps an `airhub-net` session with an in-memory
//! model of the controller's units and zones, emits typed change events,
//! and exposes the fire-and-forget command API. The protocol has no
//! acknowledgements: a command's effect shows up later as an unsolicited
//! status event, never as a return value.

pub mod client;
pub mod climate;
pub mod error;
pub mod events;
pub mod state;

pub use airhub_net::{discover, DiscoveredController};
pub use client::ControllerClient;
pub use climate::{ClimateAction, TargetMode};
pub use error::ClientError;
pub use events::ControllerEvent;
pub use state::{ControllerState, Unit, Zone};
