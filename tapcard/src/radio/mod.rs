// tapcard/src/radio/mod.rs

//! Radio abstraction: the platform radio contract and a scripted mock.

/// Scripted radio and tag for tests.
pub mod mock;
/// Radio, tag link and completion types.
pub mod traits;

pub use mock::{MockRadio, MockTag};
pub use traits::{
    ConnectCompletion, InvalidationReason, LinkError, PollingTarget, RadioLink, ReplyCompletion,
    Tag, TagLink, WireReply,
};
