//! Event transport adapters.
//!
//! Bridges typed events and raw channel messages:
//! - `EventProducer` - Encodes and publishes events
//! - `EventConsumer` - Decodes messages and invokes an `EventHandler`

mod consumer;
mod producer;

pub use consumer::{EventConsumer, ReceiveOutcome};
pub use producer::EventProducer;
