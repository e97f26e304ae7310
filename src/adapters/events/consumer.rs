//! EventConsumer - Decodes channel messages and hands them to a handler.
//!
//! This is the error boundary of the consuming side: undecodable payloads
//! and handler failures are logged and the message is treated as consumed,
//! so one bad message never stops a subscription.

use async_trait::async_trait;
use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::ports::{
    DeliveryMetadata, EventCodec, EventHandler, MessageChannel, MessageHandler, ReceivedMessage,
    Subscription, TransportError,
};

/// What happened to one received message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Decoded and processed by the handler.
    Handled,
    /// Payload could not be decoded into a valid event; dropped.
    Rejected(TransportError),
    /// Handler returned an error or panicked; dropped.
    HandlerFailed { handler: &'static str, error: String },
}

/// Consumes events of type `E` on behalf of an [`EventHandler`].
pub struct EventConsumer<E> {
    codec: Arc<dyn EventCodec<E>>,
    handler: Arc<dyn EventHandler<E>>,
}

impl<E> EventConsumer<E>
where
    E: fmt::Debug + Send + Sync + 'static,
{
    pub fn new(codec: Arc<dyn EventCodec<E>>, handler: Arc<dyn EventHandler<E>>) -> Self {
        Self { codec, handler }
    }

    /// Processes one message payload.
    pub async fn on_receive(&self, payload: &[u8], delivery: &DeliveryMetadata) -> ReceiveOutcome {
        tracing::info!(
            channel = %delivery.channel,
            partition = delivery.partition,
            offset = %delivery.offset,
            handler = self.handler.name(),
            "Received event"
        );

        let event = match self.codec.decode(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    channel = %delivery.channel,
                    partition = delivery.partition,
                    offset = %delivery.offset,
                    error = %e,
                    payload = %String::from_utf8_lossy(payload),
                    "Dropping undecodable message"
                );
                return ReceiveOutcome::Rejected(e);
            }
        };

        tracing::debug!(event = ?event, "Decoded event");

        let handled = AssertUnwindSafe(self.handler.handle(event, delivery))
            .catch_unwind()
            .await;

        match handled {
            Ok(Ok(())) => {
                tracing::debug!(
                    channel = %delivery.channel,
                    offset = %delivery.offset,
                    "Event processed"
                );
                ReceiveOutcome::Handled
            }
            Ok(Err(e)) => {
                tracing::error!(
                    channel = %delivery.channel,
                    partition = delivery.partition,
                    offset = %delivery.offset,
                    handler = self.handler.name(),
                    error = %e,
                    "Failed to process event"
                );
                ReceiveOutcome::HandlerFailed {
                    handler: self.handler.name(),
                    error: e.to_string(),
                }
            }
            Err(_) => {
                tracing::error!(
                    channel = %delivery.channel,
                    partition = delivery.partition,
                    offset = %delivery.offset,
                    handler = self.handler.name(),
                    "Handler panicked while processing event"
                );
                ReceiveOutcome::HandlerFailed {
                    handler: self.handler.name(),
                    error: "handler panicked".to_string(),
                }
            }
        }
    }

    /// Joins consumer group `group_id` on `channel_name`.
    pub async fn subscribe(
        self: Arc<Self>,
        channel: &dyn MessageChannel,
        channel_name: &str,
        group_id: &str,
    ) -> Result<Subscription, TransportError> {
        let subscription = channel.subscribe(channel_name, group_id, self).await?;
        tracing::info!(
            channel = channel_name,
            group_id,
            provider = channel.name(),
            "Consumer subscribed"
        );
        Ok(subscription)
    }
}

#[async_trait]
impl<E> MessageHandler for EventConsumer<E>
where
    E: fmt::Debug + Send + Sync + 'static,
{
    async fn on_message(&self, message: ReceivedMessage) {
        self.on_receive(&message.payload, &message.delivery).await;
    }

    fn name(&self) -> &'static str {
        self.handler.name()
    }
}

impl<E: Send + 'static> fmt::Debug for EventConsumer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventConsumer")
            .field("handler", &self.handler.name())
            .field("content_type", &self.codec.content_type())
            .finish()
    }
}
