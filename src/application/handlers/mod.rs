//! Application handlers.
//!
//! Command handlers that publish events and event handlers that react to
//! consumed ones.

pub mod user_event;

pub use user_event::{
    ActivityCounts, EventVariant, SendUserEvent, SendUserEventHandler, UserActivityLogger,
    SAMPLE_SOURCE,
};
