//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers build and publish events; event handlers consume them.

pub mod handlers;

pub use handlers::{
    ActivityCounts, EventVariant, SendUserEvent, SendUserEventHandler, UserActivityLogger,
    SAMPLE_SOURCE,
};
