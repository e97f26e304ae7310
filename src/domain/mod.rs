//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (timestamp, errors)
//! - `user_event` - User activity events in immutable and mutable form

pub mod foundation;
pub mod user_event;
