//! Network transports for airhub: the per-controller TCP session and the
//! UDP discovery helper. Everything here is tokio-based; the protocol
//! itself lives in `airhub-core`.

pub mod discovery;
pub mod session;

pub use discovery::{discover, DiscoveredController};
pub use session::{
    ControllerSession, SessionConfig, SessionError, SessionEvent, UnitAbility, CONTROLLER_PORT,
};
