//! Foundation module - Shared domain primitives.
//!
//! Contains the time value object and error types that the
//! user event model and the transport layer build on.

mod errors;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use timestamp::{Timestamp, TimestampParseError, TIMESTAMP_FORMAT};
