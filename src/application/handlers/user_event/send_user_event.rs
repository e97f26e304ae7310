//! SendUserEventHandler - Command handler for publishing user events.
//!
//! Turns a [`SendUserEvent`] command into an event stamped with the current
//! time and hands it to the publisher of the requested representation.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::domain::foundation::{Timestamp, ValidationError};
use crate::domain::user_event::{event_types, Metadata, UserEvent, UserEventDraft};
use crate::ports::{EventPublisher, PendingDelivery};

/// Metadata `source` of sample events.
pub const SAMPLE_SOURCE: &str = "sample-api";

/// Which event representation to publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventVariant {
    Immutable,
    Mutable,
}

/// Command to publish one user event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendUserEvent {
    pub user_id: Option<String>,
    pub event_type: Option<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl SendUserEvent {
    pub fn new(user_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            event_type: Some(event_type.into()),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Handler for publishing user events in either representation.
pub struct SendUserEventHandler {
    immutable: Arc<dyn EventPublisher<UserEvent>>,
    mutable: Arc<dyn EventPublisher<UserEventDraft>>,
}

impl SendUserEventHandler {
    pub fn new(
        immutable: Arc<dyn EventPublisher<UserEvent>>,
        mutable: Arc<dyn EventPublisher<UserEventDraft>>,
    ) -> Self {
        Self { immutable, mutable }
    }

    /// Validates the command and starts publishing it.
    ///
    /// # Errors
    ///
    /// `ValidationError` when `user_id` or `event_type` is missing or blank.
    /// Nothing is published in that case.
    pub fn handle(
        &self,
        cmd: SendUserEvent,
        variant: EventVariant,
    ) -> Result<PendingDelivery, ValidationError> {
        let user_id = cmd.user_id.unwrap_or_default();
        let event_type = cmd.event_type.unwrap_or_default();
        let now = Timestamp::now();

        let pending = match variant {
            EventVariant::Immutable => {
                let event = UserEvent::new(user_id, event_type, now, cmd.metadata)?;
                tracing::info!(
                    channel = self.immutable.channel(),
                    user_id = event.user_id(),
                    event_type = event.event_type(),
                    "Publishing immutable event"
                );
                self.immutable.publish(event)
            }
            EventVariant::Mutable => {
                let draft = UserEventDraft::new(user_id, event_type, now, cmd.metadata)?;
                tracing::info!(
                    channel = self.mutable.channel(),
                    user_id = draft.user_id(),
                    event_type = draft.event_type(),
                    "Publishing mutable event"
                );
                self.mutable.publish(draft)
            }
        };

        Ok(pending)
    }

    /// Publishes one sample `LOGIN` event per representation.
    ///
    /// Returns the immutable delivery first, then the mutable one.
    pub fn send_samples(&self) -> Result<Vec<PendingDelivery>, ValidationError> {
        let immutable = self.handle(
            SendUserEvent::new("sample-user-immutable", event_types::LOGIN)
                .with_metadata(sample_metadata()),
            EventVariant::Immutable,
        )?;
        let mutable = self.handle(
            SendUserEvent::new("sample-user-mutable", event_types::LOGIN)
                .with_metadata(sample_metadata()),
            EventVariant::Mutable,
        )?;

        Ok(vec![immutable, mutable])
    }
}

fn sample_metadata() -> Metadata {
    Metadata::new()
        .with("source", SAMPLE_SOURCE)
        .with("timestamp", Utc::now().timestamp_millis())
}
