//! UserActivityLogger - Event handler recording user sign-in activity.
//!
//! Reacts to user events of either representation: logs logins and
//! logouts, logs metadata at debug level and keeps per-kind counters.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::user_event::UserEventView;
use crate::ports::{DeliveryMetadata, EventHandler};

/// Counts of events seen by a [`UserActivityLogger`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityCounts {
    pub logins: u64,
    pub logouts: u64,
    pub other: u64,
}

impl ActivityCounts {
    pub fn total(&self) -> u64 {
        self.logins + self.logouts + self.other
    }
}

/// Logs user activity for every consumed event.
#[derive(Debug, Default)]
pub struct UserActivityLogger {
    logins: AtomicU64,
    logouts: AtomicU64,
    other: AtomicU64,
}

impl UserActivityLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> ActivityCounts {
        ActivityCounts {
            logins: self.logins.load(Ordering::Relaxed),
            logouts: self.logouts.load(Ordering::Relaxed),
            other: self.other.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl<E> EventHandler<E> for UserActivityLogger
where
    E: UserEventView + fmt::Debug + Send + Sync + 'static,
{
    async fn handle(&self, event: E, delivery: &DeliveryMetadata) -> Result<(), DomainError> {
        let user_id = event.user_id().unwrap_or_default();
        let event_type = event.event_type().unwrap_or_default();

        tracing::info!(
            channel = %delivery.channel,
            partition = delivery.partition,
            offset = %delivery.offset,
            user_id,
            event_type,
            "Processing user event"
        );

        if event.is_login_event() {
            self.logins.fetch_add(1, Ordering::Relaxed);
            tracing::info!(user_id, timestamp = ?event.timestamp(), "User logged in");
        } else if event.is_logout_event() {
            self.logouts.fetch_add(1, Ordering::Relaxed);
            tracing::info!(user_id, timestamp = ?event.timestamp(), "User logged out");
        } else {
            self.other.fetch_add(1, Ordering::Relaxed);
        }

        if let Some(metadata) = event.metadata().filter(|m| !m.is_empty()) {
            tracing::debug!(user_id, metadata = ?metadata, "Event metadata");
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "UserActivityLogger"
    }
}
