//! Redis Streams message channel for multi-process deployments.
//!
//! Each partition of a channel is its own stream named
//! `"{channel}:{partition}"`. Publishing is `XADD`; consuming uses consumer
//! groups (`XREADGROUP` + `XACK`) with one reader task per partition.
//!
//! Delivery is at least once. Each reader has a fixed consumer name and
//! starts by re-reading the entries that name was given but never
//! acknowledged, so a crash between delivery and `XACK` repeats the entry
//! instead of losing it.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::streams::{StreamId, StreamMaxlen, StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, RedisResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::Partitioner;
use crate::ports::{
    DeliveryMetadata, DeliveryReceipt, MessageChannel, MessageHandler, ReceivedMessage,
    Subscription, TransportError,
};

const KEY_FIELD: &str = "key";
const PAYLOAD_FIELD: &str = "payload";

/// Delay before a reader retries after a failed `XREADGROUP`.
const READ_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Stream name for one partition of a channel.
pub fn stream_key(channel: &str, partition: u32) -> String {
    format!("{}:{}", channel, partition)
}

/// Consumer name of the reader for one partition of a group.
///
/// Stable across restarts so a new reader picks up what the previous one
/// left pending.
pub fn consumer_name(group_id: &str, partition: u32) -> String {
    format!("{}-{}", group_id, partition)
}

/// Tuning for [`RedisStreamChannel`].
#[derive(Debug, Clone)]
pub struct RedisStreamSettings {
    /// Number of streams per channel.
    pub partitions: u32,
    /// How long one `XREADGROUP` blocks waiting for entries.
    pub block: Duration,
    /// Maximum entries fetched per read.
    pub read_count: usize,
    /// Approximate stream length cap applied on `XADD`.
    pub max_len: Option<usize>,
}

impl Default for RedisStreamSettings {
    fn default() -> Self {
        Self {
            partitions: 3,
            block: Duration::from_millis(1000),
            read_count: 10,
            max_len: None,
        }
    }
}

impl RedisStreamSettings {
    pub fn with_partitions(mut self, partitions: u32) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn with_block(mut self, block: Duration) -> Self {
        self.block = block;
        self
    }

    pub fn with_read_count(mut self, read_count: usize) -> Self {
        self.read_count = read_count;
        self
    }

    pub fn with_max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len;
        self
    }
}

/// Partitioned channel on top of Redis Streams.
///
/// New consumer groups start from the beginning of each stream, so messages
/// published before the first subscription are still delivered.
pub struct RedisStreamChannel {
    client: redis::Client,
    conn: MultiplexedConnection,
    partitioner: Partitioner,
    settings: RedisStreamSettings,
}

impl RedisStreamChannel {
    /// Opens a client for `url` and establishes the shared publish
    /// connection.
    pub async fn connect(url: &str, settings: RedisStreamSettings) -> Result<Self, TransportError> {
        let client = redis::Client::open(url).map_err(|e| TransportError::ConnectionFailed {
            target: "redis".to_string(),
            cause: e.to_string(),
        })?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| TransportError::ConnectionFailed {
                target: "redis".to_string(),
                cause: e.to_string(),
            })?;

        tracing::info!(
            partitions = settings.partitions,
            block_ms = settings.block.as_millis() as u64,
            "Connected to Redis streams"
        );

        Ok(Self {
            client,
            conn,
            partitioner: Partitioner::new(settings.partitions),
            settings,
        })
    }

    async fn ensure_group(
        &self,
        conn: &mut MultiplexedConnection,
        channel: &str,
        group_id: &str,
        stream: &str,
    ) -> Result<(), TransportError> {
        let created: RedisResult<()> = conn.xgroup_create_mkstream(stream, group_id, "0").await;
        match created {
            Ok(()) => {
                tracing::debug!(stream, group_id, "Created consumer group");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(TransportError::SubscribeFailed {
                channel: channel.to_string(),
                group_id: group_id.to_string(),
                cause: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl MessageChannel for RedisStreamChannel {
    async fn publish(
        &self,
        channel: &str,
        key: Option<&str>,
        payload: Vec<u8>,
    ) -> Result<DeliveryReceipt, TransportError> {
        let partition = self.partitioner.partition_for(key);
        let stream = stream_key(channel, partition);

        let mut fields: Vec<(&str, &[u8])> = Vec::with_capacity(2);
        if let Some(key) = key {
            fields.push((KEY_FIELD, key.as_bytes()));
        }
        fields.push((PAYLOAD_FIELD, payload.as_slice()));

        let mut conn = self.conn.clone();
        let added: RedisResult<String> = match self.settings.max_len {
            Some(max_len) => {
                conn.xadd_maxlen(&stream, StreamMaxlen::Approx(max_len), "*", fields.as_slice())
                    .await
            }
            None => conn.xadd(&stream, "*", fields.as_slice()).await,
        };

        let offset = added.map_err(|e| TransportError::PublishFailed {
            channel: channel.to_string(),
            cause: e.to_string(),
        })?;

        Ok(DeliveryMetadata::new(channel, partition, offset))
    }

    async fn subscribe(
        &self,
        channel: &str,
        group_id: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Subscription, TransportError> {
        let mut conn = self.conn.clone();
        for partition in 0..self.partitioner.partitions() {
            let stream = stream_key(channel, partition);
            self.ensure_group(&mut conn, channel, group_id, &stream).await?;
        }

        let (stop, stopped) = watch::channel(false);
        let mut tasks = Vec::with_capacity(self.partitioner.partitions() as usize);

        for partition in 0..self.partitioner.partitions() {
            // Blocking reads get their own connection so they never stall
            // publishes on the shared one.
            let conn = self
                .client
                .get_multiplexed_tokio_connection()
                .await
                .map_err(|e| TransportError::SubscribeFailed {
                    channel: channel.to_string(),
                    group_id: group_id.to_string(),
                    cause: e.to_string(),
                })?;

            let reader = PartitionReader {
                conn,
                channel: channel.to_string(),
                partition,
                stream: stream_key(channel, partition),
                group_id: group_id.to_string(),
                consumer: consumer_name(group_id, partition),
                handler: Arc::clone(&handler),
                block: self.settings.block,
                read_count: self.settings.read_count,
                stopped: stopped.clone(),
            };
            tasks.push(tokio::spawn(reader.run()));
        }

        tracing::info!(
            channel,
            group_id,
            partitions = self.partitioner.partitions(),
            handler = handler.name(),
            "Subscribed to Redis streams"
        );

        Ok(Subscription::new(channel, group_id, stop, tasks))
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        let mut conn = self.conn.clone();
        let pong: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        pong.map(|_| ())
            .map_err(|e| TransportError::Unavailable(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "redis_streams"
    }
}

impl std::fmt::Debug for RedisStreamChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStreamChannel")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Consumer loop for one partition stream.
struct PartitionReader {
    conn: MultiplexedConnection,
    channel: String,
    partition: u32,
    stream: String,
    group_id: String,
    consumer: String,
    handler: Arc<dyn MessageHandler>,
    block: Duration,
    read_count: usize,
    stopped: watch::Receiver<bool>,
}

impl PartitionReader {
    async fn run(mut self) {
        let options = StreamReadOptions::default()
            .group(&self.group_id, &self.consumer)
            .count(self.read_count)
            .block(self.block.as_millis() as usize);
        let streams = [self.stream.clone()];
        let mut cursor = ReadCursor::start();

        tracing::debug!(
            stream = %self.stream,
            consumer = %self.consumer,
            "Partition reader started"
        );

        loop {
            // A closed stop channel means the subscription handle is gone.
            if *self.stopped.borrow() || self.stopped.has_changed().is_err() {
                break;
            }

            // Never cancelled mid-flight: entries in a dropped reply would
            // sit in the pending list. `block` bounds the wait instead.
            let start = [cursor.id().to_string()];
            let read: RedisResult<Option<StreamReadReply>> =
                self.conn.xread_options(&streams, &start, &options).await;

            match read {
                Ok(reply) => {
                    let entries: Vec<StreamId> = reply
                        .into_iter()
                        .flat_map(|reply| reply.keys)
                        .flat_map(|key| key.ids)
                        .collect();
                    cursor = cursor.advance(entries.last().map(|entry| entry.id.as_str()));
                    if cursor.is_pending() && !entries.is_empty() {
                        tracing::info!(
                            stream = %self.stream,
                            consumer = %self.consumer,
                            count = entries.len(),
                            "Redelivering unacknowledged entries"
                        );
                    }
                    for entry in entries {
                        self.deliver(entry).await;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        stream = %self.stream,
                        group_id = %self.group_id,
                        error = %e,
                        "Failed to read from stream"
                    );
                    tokio::select! {
                        _ = self.stopped.changed() => break,
                        _ = tokio::time::sleep(READ_RETRY_DELAY) => {}
                    }
                }
            }
        }

        tracing::debug!(
            stream = %self.stream,
            consumer = %self.consumer,
            "Partition reader stopped"
        );
    }

    /// Hands one entry to the handler, then acknowledges it whatever the
    /// outcome.
    async fn deliver(&mut self, entry: StreamId) {
        let payload: Option<Vec<u8>> = entry.get(PAYLOAD_FIELD);
        let key: Option<String> = entry.get(KEY_FIELD);

        match payload {
            Some(payload) => {
                let message = ReceivedMessage {
                    delivery: DeliveryMetadata::new(
                        &self.channel,
                        self.partition,
                        entry.id.clone(),
                    ),
                    key,
                    payload,
                };
                self.handler.on_message(message).await;
            }
            None => {
                tracing::warn!(
                    stream = %self.stream,
                    offset = %entry.id,
                    "Skipping stream entry without payload"
                );
            }
        }

        let acked: RedisResult<i64> = self
            .conn
            .xack(&self.stream, &self.group_id, &[&entry.id])
            .await;
        if let Err(e) = acked {
            tracing::error!(
                stream = %self.stream,
                offset = %entry.id,
                error = %e,
                "Failed to acknowledge stream entry"
            );
        }
    }
}

/// Start id of the next `XREADGROUP` for one reader.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReadCursor {
    /// Entries already delivered to this consumer and still unacknowledged,
    /// after the given id.
    Pending(String),
    /// Entries never delivered to any consumer of the group.
    New,
}

impl ReadCursor {
    fn start() -> Self {
        ReadCursor::Pending("0".to_string())
    }

    fn id(&self) -> &str {
        match self {
            ReadCursor::Pending(after) => after,
            ReadCursor::New => ">",
        }
    }

    fn is_pending(&self) -> bool {
        matches!(self, ReadCursor::Pending(_))
    }

    /// Moves past a batch whose last entry id is `last_id`.
    ///
    /// An empty pending batch means the backlog is drained.
    fn advance(self, last_id: Option<&str>) -> Self {
        match (self, last_id) {
            (ReadCursor::Pending(_), Some(id)) => ReadCursor::Pending(id.to_string()),
            (ReadCursor::Pending(_), None) => ReadCursor::New,
            (ReadCursor::New, _) => ReadCursor::New,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_key_appends_partition() {
        assert_eq!(stream_key("user-events.immutable", 2), "user-events.immutable:2");
    }

    #[test]
    fn consumer_name_is_stable_per_group_and_partition() {
        assert_eq!(consumer_name("immutable-consumer-group", 1), "immutable-consumer-group-1");
        assert_eq!(consumer_name("g", 1), consumer_name("g", 1));
        assert_ne!(consumer_name("g", 0), consumer_name("g", 1));
    }

    #[test]
    fn reader_drains_pending_entries_before_new_ones() {
        let cursor = ReadCursor::start();
        assert_eq!(cursor.id(), "0");

        let cursor = cursor.advance(Some("1700000000000-0"));
        assert_eq!(cursor.id(), "1700000000000-0");
        assert!(cursor.is_pending());

        let cursor = cursor.advance(Some("1700000000005-2"));
        assert_eq!(cursor.id(), "1700000000005-2");

        let cursor = cursor.advance(None);
        assert_eq!(cursor, ReadCursor::New);
        assert_eq!(cursor.id(), ">");
    }

    #[test]
    fn reader_stays_on_new_entries_once_backlog_is_drained() {
        let cursor = ReadCursor::start().advance(None);

        assert_eq!(cursor.clone().advance(Some("1700000000000-0")), ReadCursor::New);
        assert_eq!(cursor.advance(None), ReadCursor::New);
    }

    #[test]
    fn settings_defaults() {
        let settings = RedisStreamSettings::default();

        assert_eq!(settings.partitions, 3);
        assert_eq!(settings.block, Duration::from_millis(1000));
        assert_eq!(settings.read_count, 10);
        assert_eq!(settings.max_len, None);
    }

    #[test]
    fn settings_builders() {
        let settings = RedisStreamSettings::default()
            .with_partitions(6)
            .with_block(Duration::from_millis(250))
            .with_read_count(50)
            .with_max_len(Some(10_000));

        assert_eq!(settings.partitions, 6);
        assert_eq!(settings.block, Duration::from_millis(250));
        assert_eq!(settings.read_count, 50);
        assert_eq!(settings.max_len, Some(10_000));
    }

    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let result = RedisStreamChannel::connect("not-a-url", RedisStreamSettings::default()).await;
        assert!(matches!(result, Err(TransportError::ConnectionFailed { .. })));
    }

    // Integration tests require a running Redis instance:
    //
    // #[tokio::test]
    // #[ignore] // Run with: cargo test -- --ignored
    // async fn publish_and_consume_through_redis() {
    //     let settings = RedisStreamSettings::default();
    //     let channel = RedisStreamChannel::connect("redis://127.0.0.1/", settings)
    //         .await
    //         .unwrap();
    //     // ... subscribe a recording handler, publish, wait for delivery
    // }
}
