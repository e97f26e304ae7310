//! Payload codecs.

mod json;

pub use json::JsonCodec;
