//! EventPublisher port - Interface for publishing user events.
//!
//! This port defines how callers hand events to the transport without
//! knowing about the underlying channel (in-memory, Redis, etc.).

use futures::future::{self, BoxFuture, FutureExt};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use super::{DeliveryReceipt, TransportError};
use crate::domain::user_event::{UserEvent, UserEventDraft};

/// Routing key used to pick a channel partition.
pub trait PartitionKey {
    /// `None` lets the channel spread the message over partitions.
    fn partition_key(&self) -> Option<&str>;
}

impl PartitionKey for UserEvent {
    fn partition_key(&self) -> Option<&str> {
        Some(self.user_id())
    }
}

impl PartitionKey for UserEventDraft {
    fn partition_key(&self) -> Option<&str> {
        self.user_id()
    }
}

/// Outcome of a publish that is already in flight.
///
/// The send starts as soon as the publisher returns this handle; awaiting
/// it only observes the result. Dropping it does not cancel the send.
pub struct PendingDelivery {
    inner: BoxFuture<'static, Result<DeliveryReceipt, TransportError>>,
}

impl PendingDelivery {
    /// Runs `delivery` on the tokio runtime and tracks its result.
    pub fn spawn<F>(delivery: F) -> Self
    where
        F: Future<Output = Result<DeliveryReceipt, TransportError>> + Send + 'static,
    {
        let handle = tokio::spawn(delivery);
        Self {
            inner: async move {
                match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(TransportError::TaskFailed(e.to_string())),
                }
            }
            .boxed(),
        }
    }

    /// A delivery that has already finished, e.g. failed before sending.
    pub fn ready(result: Result<DeliveryReceipt, TransportError>) -> Self {
        Self {
            inner: future::ready(result).boxed(),
        }
    }
}

impl Future for PendingDelivery {
    type Output = Result<DeliveryReceipt, TransportError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

/// Port for publishing events of type `E`.
///
/// Publishing never blocks: each call returns a [`PendingDelivery`] that
/// resolves to the partition and offset, or to the transport error.
pub trait EventPublisher<E>: Send + Sync {
    /// Publish a single event.
    fn publish(&self, event: E) -> PendingDelivery;

    /// Publish several events, each independently.
    ///
    /// There is no atomicity across the batch; some deliveries may succeed
    /// while others fail, and nothing is rolled back.
    fn publish_all(&self, events: Vec<E>) -> Vec<PendingDelivery> {
        events.into_iter().map(|event| self.publish(event)).collect()
    }

    /// Name of the channel events are published to.
    fn channel(&self) -> &str;
}
