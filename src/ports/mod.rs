//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Publishes events, returning a pending delivery
//! - `EventHandler` - Application code that processes decoded events
//! - `EventCodec` - Converts events to and from channel payloads
//!
//! ## Channel Ports
//!
//! - `MessageChannel` - Partitioned publish-subscribe broker
//! - `MessageHandler` - Raw per-message callback used by subscriptions

mod event_codec;
mod event_publisher;
mod event_subscriber;
mod message_channel;
mod transport_error;

pub use event_codec::EventCodec;
pub use event_publisher::{EventPublisher, PartitionKey, PendingDelivery};
pub use event_subscriber::EventHandler;
pub use message_channel::{
    DeliveryMetadata, DeliveryReceipt, MessageChannel, MessageHandler, ReceivedMessage,
    Subscription,
};
pub use transport_error::TransportError;
