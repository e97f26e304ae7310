//! EventProducer - Publishes typed events to a message channel.
//!
//! Encoding happens on the caller's task; the channel send runs on a
//! spawned task so `publish` never waits on the broker.

use std::fmt;
use std::sync::Arc;

use crate::ports::{
    DeliveryReceipt, EventCodec, EventPublisher, MessageChannel, PartitionKey, PendingDelivery,
    TransportError,
};

/// Publishes events of type `E` to one named channel.
///
/// Every delivery is logged when it completes: `info` with partition and
/// offset on success, `error` with the event on failure. Nothing is
/// retried.
pub struct EventProducer<E> {
    channel: Arc<dyn MessageChannel>,
    codec: Arc<dyn EventCodec<E>>,
    channel_name: String,
}

impl<E> EventProducer<E>
where
    E: PartitionKey + fmt::Debug + Send + Sync + 'static,
{
    pub fn new(
        channel: Arc<dyn MessageChannel>,
        codec: Arc<dyn EventCodec<E>>,
        channel_name: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            codec,
            channel_name: channel_name.into(),
        }
    }

    /// Publishes `event` and runs `callback` with the outcome once the
    /// channel has answered.
    ///
    /// The callback also runs, before this returns, when the event cannot be
    /// encoded.
    pub fn publish_with<F>(&self, event: E, callback: F) -> PendingDelivery
    where
        F: FnOnce(&Result<DeliveryReceipt, TransportError>) + Send + 'static,
    {
        let payload = match self.codec.encode(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(
                    channel = %self.channel_name,
                    error = %e,
                    event = ?event,
                    "Failed to encode event"
                );
                let result = Err(e);
                callback(&result);
                return PendingDelivery::ready(result);
            }
        };

        let channel = Arc::clone(&self.channel);
        let channel_name = self.channel_name.clone();
        let key = event.partition_key().map(str::to_string);

        tracing::debug!(
            channel = %channel_name,
            key = ?key,
            bytes = payload.len(),
            "Sending event"
        );

        PendingDelivery::spawn(async move {
            let result = channel.publish(&channel_name, key.as_deref(), payload).await;

            match &result {
                Ok(receipt) => tracing::info!(
                    channel = %channel_name,
                    key = ?key,
                    partition = receipt.partition,
                    offset = %receipt.offset,
                    "Event delivered"
                ),
                Err(e) => tracing::error!(
                    channel = %channel_name,
                    key = ?key,
                    error = %e,
                    transient = e.is_transient(),
                    event = ?event,
                    "Failed to deliver event"
                ),
            }

            callback(&result);
            result
        })
    }
}

impl<E> EventPublisher<E> for EventProducer<E>
where
    E: PartitionKey + fmt::Debug + Send + Sync + 'static,
{
    fn publish(&self, event: E) -> PendingDelivery {
        self.publish_with(event, |_| {})
    }

    fn channel(&self) -> &str {
        &self.channel_name
    }
}

impl<E> fmt::Debug for EventProducer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventProducer")
            .field("channel_name", &self.channel_name)
            .field("provider", &self.channel.name())
            .field("content_type", &self.codec.content_type())
            .finish()
    }
}
