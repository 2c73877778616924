// tapcard/src/session/mod.rs

//! Scan sessions: lifecycle state, generation-tagged events and the
//! controller that drives one scan at a time.

/// Per-scan session record.
pub mod card_session;
/// The scan controller and its builder.
pub mod controller;
/// Radio events, the event sink and published scan events.
pub mod events;
/// Generations and the lifecycle state machine.
pub mod state;

pub use card_session::CardSession;
pub use controller::{ControllerBuilder, ScanController};
pub use events::{EventSink, RadioEvent, ScanEvent};
pub use state::{Generation, SessionState};
