//! Message channel providers.
//!
//! - `InMemoryChannel` - Synchronous delivery for tests and local runs
//! - `RedisStreamChannel` - Redis Streams with consumer groups

mod in_memory;
mod partitioner;
mod redis_streams;

pub use in_memory::InMemoryChannel;
pub use partitioner::Partitioner;
pub use redis_streams::{consumer_name, stream_key, RedisStreamChannel, RedisStreamSettings};
