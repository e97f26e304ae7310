//! In-memory message channel for tests and local runs.
//!
//! Provides synchronous, deterministic delivery: `publish` appends to the
//! partition log and hands the message to every subscribed consumer group
//! before it returns.
//!
//! # Security Note
//!
//! This adapter is for **testing and local development**. Its test helpers
//! use `.expect()` on lock operations which will panic if locks are
//! poisoned. Deployments should use the Redis streams channel.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

use super::Partitioner;
use crate::ports::{
    DeliveryMetadata, DeliveryReceipt, MessageChannel, MessageHandler, ReceivedMessage,
    Subscription, TransportError,
};

struct GroupMember {
    handler: Arc<dyn MessageHandler>,
    stopped: watch::Receiver<bool>,
}

impl GroupMember {
    // A dropped subscription handle counts as stopped.
    fn is_active(&self) -> bool {
        !*self.stopped.borrow() && self.stopped.has_changed().is_ok()
    }
}

/// Partition logs of one channel.
type PartitionLogs = Vec<Vec<ReceivedMessage>>;

/// In-memory partitioned channel.
///
/// Features:
/// - Per-partition logs with offsets `0, 1, 2, ...`
/// - Consumer groups: within a group, partition `p` goes to member
///   `p % members`; every group sees every message
/// - Message capture for assertions
/// - Fault switch to make publishing fail
///
/// # Panics
///
/// The test helpers panic if internal locks are poisoned.
///
/// # Example
///
/// ```ignore
/// let channel = Arc::new(InMemoryChannel::new(3));
/// let subscription = channel.subscribe("user-events", "loggers", handler).await?;
///
/// channel.publish("user-events", Some("bob"), payload).await?;
///
/// assert_eq!(channel.message_count("user-events"), 1);
/// ```
pub struct InMemoryChannel {
    partitioner: Partitioner,
    logs: RwLock<HashMap<String, PartitionLogs>>,
    groups: RwLock<HashMap<String, BTreeMap<String, Vec<GroupMember>>>>,
    available: AtomicBool,
}

impl InMemoryChannel {
    pub fn new(partitions: u32) -> Self {
        Self {
            partitioner: Partitioner::new(partitions),
            logs: RwLock::new(HashMap::new()),
            groups: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn partitions(&self) -> u32 {
        self.partitioner.partitions()
    }

    /// Makes every following publish and health check fail (or succeed
    /// again).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Picks one active member per consumer group for `partition`.
    fn recipients(
        &self,
        channel: &str,
        partition: u32,
    ) -> Result<Vec<Arc<dyn MessageHandler>>, TransportError> {
        let groups = self
            .groups
            .read()
            .map_err(|_| TransportError::Unavailable("consumer group lock poisoned".to_string()))?;

        let Some(channel_groups) = groups.get(channel) else {
            return Ok(Vec::new());
        };

        Ok(channel_groups
            .values()
            .filter_map(|members| {
                let active: Vec<&GroupMember> = members.iter().filter(|m| m.is_active()).collect();
                if active.is_empty() {
                    None
                } else {
                    let member = active[partition as usize % active.len()];
                    Some(Arc::clone(&member.handler))
                }
            })
            .collect())
    }

    // === Test Helpers ===

    /// Returns all messages of `channel`, partition by partition in offset
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn messages(&self, channel: &str) -> Vec<ReceivedMessage> {
        self.logs
            .read()
            .expect("InMemoryChannel: logs lock poisoned")
            .get(channel)
            .map(|partitions| partitions.iter().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the messages stored in one partition of `channel`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn partition_messages(&self, channel: &str, partition: u32) -> Vec<ReceivedMessage> {
        self.logs
            .read()
            .expect("InMemoryChannel: logs lock poisoned")
            .get(channel)
            .and_then(|partitions| partitions.get(partition as usize))
            .cloned()
            .unwrap_or_default()
    }

    /// Returns count of messages published to `channel`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn message_count(&self, channel: &str) -> usize {
        self.logs
            .read()
            .expect("InMemoryChannel: logs lock poisoned")
            .get(channel)
            .map_or(0, |partitions| partitions.iter().map(Vec::len).sum())
    }

    /// Clears all stored messages (for test isolation). Offsets restart at
    /// zero; subscriptions are kept.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear(&self) {
        self.logs
            .write()
            .expect("InMemoryChannel: logs write lock poisoned")
            .clear();
    }
}

impl Default for InMemoryChannel {
    fn default() -> Self {
        Self::new(3)
    }
}

#[async_trait]
impl MessageChannel for InMemoryChannel {
    async fn publish(
        &self,
        channel: &str,
        key: Option<&str>,
        payload: Vec<u8>,
    ) -> Result<DeliveryReceipt, TransportError> {
        if !self.is_available() {
            return Err(TransportError::PublishFailed {
                channel: channel.to_string(),
                cause: "channel is unavailable".to_string(),
            });
        }

        let partition = self.partitioner.partition_for(key);
        let message = {
            let mut logs = self
                .logs
                .write()
                .map_err(|_| TransportError::PublishFailed {
                    channel: channel.to_string(),
                    cause: "log lock poisoned".to_string(),
                })?;
            let partitions = logs
                .entry(channel.to_string())
                .or_insert_with(|| vec![Vec::new(); self.partitions() as usize]);
            let log = &mut partitions[partition as usize];

            let message = ReceivedMessage {
                delivery: DeliveryMetadata::new(channel, partition, log.len().to_string()),
                key: key.map(str::to_string),
                payload,
            };
            log.push(message.clone());
            message
        };

        // Locks are released before handlers run so they may publish too.
        for handler in self.recipients(channel, partition)? {
            handler.on_message(message.clone()).await;
        }

        Ok(message.delivery)
    }

    async fn subscribe(
        &self,
        channel: &str,
        group_id: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Subscription, TransportError> {
        let (stop, stopped) = watch::channel(false);

        let mut groups = self
            .groups
            .write()
            .map_err(|_| TransportError::SubscribeFailed {
                channel: channel.to_string(),
                group_id: group_id.to_string(),
                cause: "consumer group lock poisoned".to_string(),
            })?;
        let members = groups
            .entry(channel.to_string())
            .or_default()
            .entry(group_id.to_string())
            .or_default();
        members.retain(GroupMember::is_active);
        members.push(GroupMember { handler, stopped });

        tracing::debug!(channel, group_id, members = members.len(), "Consumer joined group");

        Ok(Subscription::new(channel, group_id, stop, Vec::new()))
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(TransportError::Unavailable(
                "in-memory channel switched off".to_string(),
            ))
        }
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
