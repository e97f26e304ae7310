//! The single construction path shared by both event representations.
//!
//! Constructors, factories and wire decoding all hand their raw inputs to
//! [`EventFields::validate`], so every event in the system has passed the
//! same checks in the same order.

use serde::Deserialize;

use super::Metadata;
use crate::domain::foundation::{Timestamp, ValidationError};

pub const USER_ID_FIELD: &str = "userId";
pub const EVENT_TYPE_FIELD: &str = "eventType";
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Raw, unvalidated event inputs.
///
/// `None` plays the role of an absent or null value. This is also the
/// decode target for the JSON wire format.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EventFields {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Fields that passed validation, already normalized.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NormalizedFields {
    pub user_id: String,
    pub event_type: String,
    pub timestamp: Timestamp,
    pub metadata: Option<Metadata>,
}

impl EventFields {
    /// Bundles fully supplied inputs.
    pub fn new(
        user_id: impl Into<String>,
        event_type: impl Into<String>,
        timestamp: Timestamp,
        metadata: Option<Metadata>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            event_type: Some(event_type.into()),
            timestamp: Some(timestamp),
            metadata,
        }
    }

    /// Checks the invariants and normalizes the values.
    ///
    /// Order is fixed and the first failure wins: userId, eventType,
    /// timestamp. On success userId is trimmed and eventType is trimmed and
    /// upper-cased.
    pub(crate) fn validate(self) -> Result<NormalizedFields, ValidationError> {
        let user_id = required_text(self.user_id, USER_ID_FIELD)?;
        let event_type = required_text(self.event_type, EVENT_TYPE_FIELD)?;
        let timestamp = self
            .timestamp
            .ok_or_else(|| ValidationError::missing(TIMESTAMP_FIELD))?;

        Ok(NormalizedFields {
            user_id: user_id.trim().to_string(),
            event_type: event_type.trim().to_uppercase(),
            timestamp,
            metadata: self.metadata,
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ValidationError::blank(field)),
    }
}
