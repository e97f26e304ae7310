//! Errors raised while moving events through a message channel.

use thiserror::Error;

/// Errors that can occur while encoding, publishing or consuming events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    // Codec errors (permanent, no retry)
    /// Event could not be turned into a payload.
    #[error("Failed to encode {type_name}: {cause}")]
    Encode { type_name: &'static str, cause: String },

    /// Payload does not match the wire format or fails event validation.
    #[error("Failed to decode payload: {cause}")]
    Decode { cause: String },

    // Channel errors (transient)
    /// Channel provider rejected or lost the message.
    #[error("Failed to publish to channel {channel}: {cause}")]
    PublishFailed { channel: String, cause: String },

    /// Consumer group could not be registered.
    #[error("Failed to subscribe to channel {channel} as group {group_id}: {cause}")]
    SubscribeFailed {
        channel: String,
        group_id: String,
        cause: String,
    },

    /// Connection to the broker failed.
    #[error("Connection to {target} failed: {cause}")]
    ConnectionFailed { target: String, cause: String },

    /// Channel provider is switched off or unreachable.
    #[error("Channel unavailable: {0}")]
    Unavailable(String),

    /// Background delivery task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl TransportError {
    /// Returns true if a later attempt might succeed.
    ///
    /// Nothing in this crate retries; callers use this to decide.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::PublishFailed { .. }
                | TransportError::SubscribeFailed { .. }
                | TransportError::ConnectionFailed { .. }
                | TransportError::Unavailable(_)
        )
    }
}
