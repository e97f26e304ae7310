//! Immutable user event.

use serde::{Deserialize, Serialize};

use super::fields::{EventFields, NormalizedFields};
use super::{Metadata, UserEventView};
use crate::domain::foundation::{Timestamp, ValidationError};

/// A validated, immutable user activity event.
///
/// Fields are fixed at construction. Equality and hashing are structural.
/// Deserialization runs through the same validating constructor as
/// [`UserEvent::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "EventFields")]
pub struct UserEvent {
    user_id: String,
    event_type: String,
    timestamp: Timestamp,
    metadata: Option<Metadata>,
}

impl UserEvent {
    /// Creates a validated event.
    ///
    /// # Errors
    ///
    /// `ValidationError::InvalidArgument` naming the first field that is
    /// blank, in the order userId, eventType.
    pub fn new(
        user_id: impl Into<String>,
        event_type: impl Into<String>,
        timestamp: Timestamp,
        metadata: Option<Metadata>,
    ) -> Result<Self, ValidationError> {
        Self::try_from(EventFields::new(user_id, event_type, timestamp, metadata))
    }

    /// Creates an event stamped with the current time.
    pub fn create_now(
        user_id: impl Into<String>,
        event_type: impl Into<String>,
        metadata: Option<Metadata>,
    ) -> Result<Self, ValidationError> {
        Self::new(user_id, event_type, Timestamp::now(), metadata)
    }

    /// Creates an event stamped with the current time and empty metadata.
    pub fn create_simple(
        user_id: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(user_id, event_type, Timestamp::now(), Some(Metadata::new()))
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }
}

impl TryFrom<EventFields> for UserEvent {
    type Error = ValidationError;

    fn try_from(fields: EventFields) -> Result<Self, Self::Error> {
        let NormalizedFields {
            user_id,
            event_type,
            timestamp,
            metadata,
        } = fields.validate()?;

        Ok(Self {
            user_id,
            event_type,
            timestamp,
            metadata,
        })
    }
}

impl UserEventView for UserEvent {
    fn user_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }

    fn event_type(&self) -> Option<&str> {
        Some(&self.event_type)
    }

    fn timestamp(&self) -> Option<Timestamp> {
        Some(self.timestamp)
    }

    fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn noon() -> Timestamp {
        Timestamp::from_ymd_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn bob_login() -> UserEvent {
        UserEvent::new(
            "  bob  ",
            "login",
            noon(),
            Some(Metadata::new().with("ip", "1.2.3.4")),
        )
        .unwrap()
    }

    #[test]
    fn new_normalizes_fields() {
        let event = bob_login();

        assert_eq!(event.user_id(), "bob");
        assert_eq!(event.event_type(), "LOGIN");
        assert_eq!(event.timestamp(), noon());
        assert_eq!(event.metadata(), Some(&Metadata::new().with("ip", "1.2.3.4")));
    }

    #[test]
    fn blank_user_id_fails_with_user_id() {
        let err = UserEvent::new("   ", "LOGIN", noon(), None).unwrap_err();
        assert_eq!(err.field(), "userId");
    }

    #[test]
    fn blank_user_id_is_reported_before_blank_event_type() {
        let err = UserEvent::new("", "", noon(), None).unwrap_err();
        assert_eq!(err.field(), "userId");
    }

    #[test]
    fn blank_event_type_fails_with_event_type() {
        let err = UserEvent::new("bob", "\t", noon(), None).unwrap_err();
        assert_eq!(err.field(), "eventType");
    }

    #[test]
    fn create_simple_uses_empty_metadata() {
        let event = UserEvent::create_simple("alice", "page_view").unwrap();

        assert_eq!(event.metadata(), Some(&Metadata::new()));
        assert_eq!(event.event_type(), "PAGE_VIEW");
    }

    #[test]
    fn create_now_stamps_current_time() {
        let before = Timestamp::now();
        let event = UserEvent::create_now("alice", "LOGIN", None).unwrap();
        let after = Timestamp::now();

        assert!(!event.timestamp().is_before(&before));
        assert!(!after.is_before(&event.timestamp()));
        assert_eq!(event.metadata(), None);
    }

    #[test]
    fn login_and_logout_checks() {
        let login = UserEvent::new("u", "LOGIN", noon(), None).unwrap();
        let logout = UserEvent::new("u", "logout", noon(), None).unwrap();
        let page_view = UserEvent::new("u", "PAGE_VIEW", noon(), None).unwrap();

        assert!(login.is_login_event());
        assert!(!login.is_logout_event());
        assert!(logout.is_logout_event());
        assert!(!logout.is_login_event());
        assert!(!page_view.is_login_event());
        assert!(!page_view.is_logout_event());
    }

    #[test]
    fn metadata_value_handles_absent_metadata_and_keys() {
        let without = UserEvent::new("u", "LOGIN", noon(), None).unwrap();
        assert_eq!(without.metadata_value("ip"), None);

        let with = bob_login();
        assert_eq!(with.metadata_value("ip"), Some("1.2.3.4".to_string()));
        assert_eq!(with.metadata_value("nonexistent"), None);
    }

    #[test]
    fn structurally_equal_events_are_equal_and_hash_equal() {
        let a = bob_login();
        let metadata = Metadata::new().with("ip", "1.2.3.4");
        let b = UserEvent::new("bob", "LOGIN", noon(), Some(metadata)).unwrap();
        let c = UserEvent::new("carol", "LOGIN", noon(), None).unwrap();

        assert_eq!(a, b);

        let set: HashSet<UserEvent> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn events_differing_only_in_zero_sign_share_a_set_entry() {
        let negative: UserEvent = serde_json::from_value(json!({
            "userId": "bob",
            "eventType": "LOGIN",
            "timestamp": "2024-01-01T12:00:00",
            "metadata": {"delta": -0.0}
        }))
        .unwrap();
        let positive: UserEvent = serde_json::from_value(json!({
            "userId": "bob",
            "eventType": "LOGIN",
            "timestamp": "2024-01-01T12:00:00",
            "metadata": {"delta": 0.0}
        }))
        .unwrap();

        assert_eq!(negative, positive);
        let set: HashSet<UserEvent> = [negative, positive].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn serializes_to_wire_format() {
        let json = serde_json::to_value(bob_login()).unwrap();

        assert_eq!(
            json,
            json!({
                "userId": "bob",
                "eventType": "LOGIN",
                "timestamp": "2024-01-01T12:00:00",
                "metadata": {"ip": "1.2.3.4"}
            })
        );
    }

    #[test]
    fn absent_metadata_serializes_as_null() {
        let event = UserEvent::new("bob", "LOGIN", noon(), None).unwrap();
        let json = serde_json::to_value(event).unwrap();

        assert_eq!(json["metadata"], serde_json::Value::Null);
    }

    #[test]
    fn deserialization_validates_and_normalizes() {
        let event: UserEvent = serde_json::from_str(
            r#"{"userId":" test-user-456 ","eventType":"logout","timestamp":"2024-01-01T15:30:00",
                "metadata":{"ip":"10.0.0.1","sessionDuration":3600}}"#,
        )
        .unwrap();

        assert_eq!(event.user_id(), "test-user-456");
        assert_eq!(event.event_type(), "LOGOUT");
        assert_eq!(event.timestamp(), Timestamp::from_ymd_hms(2024, 1, 1, 15, 30, 0).unwrap());
        assert_eq!(event.metadata_value("ip"), Some("10.0.0.1".to_string()));
        assert_eq!(
            event.metadata().and_then(|m| m.get("sessionDuration")),
            Some(&json!(3600))
        );
    }

    #[test]
    fn deserialization_rejects_blank_user_id() {
        let result: Result<UserEvent, _> = serde_json::from_str(
            r#"{"userId":"  ","eventType":"LOGIN","timestamp":"2024-01-01T12:00:00"}"#,
        );

        let err = result.unwrap_err();
        assert!(err.to_string().contains("userId"));
    }

    #[test]
    fn deserialization_rejects_missing_timestamp() {
        let result: Result<UserEvent, _> =
            serde_json::from_str(r#"{"userId":"bob","eventType":"LOGIN"}"#);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("timestamp"));
    }
}
