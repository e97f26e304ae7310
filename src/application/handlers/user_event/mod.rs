//! User event command and event handlers.

mod send_user_event;
mod user_activity_logger;

pub use send_user_event::{EventVariant, SendUserEvent, SendUserEventHandler, SAMPLE_SOURCE};
pub use user_activity_logger::{ActivityCounts, UserActivityLogger};
