//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `channel` - Message channel providers (in-memory, Redis Streams)
//! - `codec` - Payload encodings
//! - `events` - Typed producers and consumers on top of a channel

pub mod channel;
pub mod codec;
pub mod events;

pub use channel::{InMemoryChannel, Partitioner, RedisStreamChannel, RedisStreamSettings};
pub use codec::JsonCodec;
pub use events::{EventConsumer, EventProducer, ReceiveOutcome};
