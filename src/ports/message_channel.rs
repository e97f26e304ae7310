//! MessageChannel port - Interface to a partitioned publish-subscribe broker.
//!
//! The channel moves opaque byte payloads. Encoding and decoding of events
//! happen one layer up, in the transport adapter.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::TransportError;

/// Where a message landed: channel, partition and offset.
///
/// Offsets are opaque strings so that broker-native ids (e.g. Redis stream
/// entry ids) can be carried without translation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeliveryMetadata {
    pub channel: String,
    pub partition: u32,
    pub offset: String,
}

/// Acknowledgment returned by a successful publish.
pub type DeliveryReceipt = DeliveryMetadata;

impl DeliveryMetadata {
    pub fn new(channel: impl Into<String>, partition: u32, offset: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            partition,
            offset: offset.into(),
        }
    }
}

impl fmt::Display for DeliveryMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]@{}", self.channel, self.partition, self.offset)
    }
}

/// A message as handed to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub delivery: DeliveryMetadata,
    pub key: Option<String>,
    pub payload: Vec<u8>,
}

/// Receives raw messages from a channel.
///
/// `on_message` cannot fail: whatever happens inside, the message counts as
/// consumed once it returns.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn on_message(&self, message: ReceivedMessage);

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for a partitioned publish-subscribe broker.
///
/// Implementations must ensure:
/// - Messages with the same key land on the same partition
/// - Each consumer group sees every message once per subscription
/// - Ordering is preserved within a partition
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Publish a payload, routed by `key`.
    async fn publish(
        &self,
        channel: &str,
        key: Option<&str>,
        payload: Vec<u8>,
    ) -> Result<DeliveryReceipt, TransportError>;

    /// Register `handler` as a member of consumer group `group_id`.
    async fn subscribe(
        &self,
        channel: &str,
        group_id: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Subscription, TransportError>;

    /// Checks that the broker is reachable.
    async fn health_check(&self) -> Result<(), TransportError>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Handle to an active subscription.
///
/// Delivery continues while the handle is alive. Call
/// [`Subscription::shutdown`] to stop and wait for the consumer tasks;
/// dropping the handle stops them without waiting.
pub struct Subscription {
    channel: String,
    group_id: String,
    stop: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Subscription {
    /// Creates a handle. `stop` is flipped to `true` on shutdown; `tasks`
    /// are awaited after that.
    pub fn new(
        channel: impl Into<String>,
        group_id: impl Into<String>,
        stop: watch::Sender<bool>,
        tasks: Vec<JoinHandle<()>>,
    ) -> Self {
        Self {
            channel: channel.into(),
            group_id: group_id.into(),
            stop,
            tasks,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn is_active(&self) -> bool {
        !*self.stop.borrow()
    }

    /// Signals every consumer task to stop and waits for them to finish.
    pub async fn shutdown(self) {
        self.stop.send_replace(true);

        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(
                    channel = %self.channel,
                    group_id = %self.group_id,
                    error = %e,
                    "Consumer task ended abnormally"
                );
            }
        }

        tracing::info!(channel = %self.channel, group_id = %self.group_id, "Subscription stopped");
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("group_id", &self.group_id)
            .field("tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that traits are object-safe
    #[allow(dead_code)]
    fn assert_channel_object_safe(_: &dyn MessageChannel) {}

    #[allow(dead_code)]
    fn assert_handler_object_safe(_: &dyn MessageHandler) {}

    #[test]
    fn delivery_metadata_display() {
        let delivery = DeliveryMetadata::new("user-events", 2, "17");
        assert_eq!(delivery.to_string(), "user-events[2]@17");
    }

    #[tokio::test]
    async fn shutdown_flips_stop_signal_and_awaits_tasks() {
        let (stop, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            while !*stopped.borrow() {
                if stopped.changed().await.is_err() {
                    break;
                }
            }
        });

        let subscription = Subscription::new("user-events", "group-a", stop, vec![task]);
        assert!(subscription.is_active());
        assert_eq!(subscription.channel(), "user-events");
        assert_eq!(subscription.group_id(), "group-a");

        subscription.shutdown().await;
    }
}
