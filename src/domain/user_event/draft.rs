//! Mutable, bean-style user event.

use serde::{Deserialize, Serialize};

use super::fields::{EventFields, NormalizedFields};
use super::{Metadata, UserEvent, UserEventView};
use crate::domain::foundation::{Timestamp, ValidationError};

/// A user event whose fields can be changed after construction.
///
/// `UserEventDraft::default()` starts with every field unset. The
/// validating constructors and wire decoding apply the same rules as
/// [`UserEvent`], but the setters do **not** validate: a draft can be put
/// into a state that would never pass construction. Call [`build`] to get
/// a checked, immutable event back.
///
/// Equality and hashing are computed over the current field values, so a
/// draft must not be mutated while it is a key in a hashed collection.
/// Drafts carry no internal synchronization; share one across tasks only
/// behind the caller's own lock.
///
/// [`build`]: UserEventDraft::build
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "EventFields")]
pub struct UserEventDraft {
    user_id: Option<String>,
    event_type: Option<String>,
    timestamp: Option<Timestamp>,
    metadata: Option<Metadata>,
}

impl UserEventDraft {
    /// Creates a validated draft.
    pub fn new(
        user_id: impl Into<String>,
        event_type: impl Into<String>,
        timestamp: Timestamp,
        metadata: Option<Metadata>,
    ) -> Result<Self, ValidationError> {
        Self::try_from(EventFields::new(user_id, event_type, timestamp, metadata))
    }

    /// Creates a draft stamped with the current time.
    pub fn create_now(
        user_id: impl Into<String>,
        event_type: impl Into<String>,
        metadata: Option<Metadata>,
    ) -> Result<Self, ValidationError> {
        Self::new(user_id, event_type, Timestamp::now(), metadata)
    }

    /// Creates a draft stamped with the current time and empty metadata.
    pub fn create_simple(
        user_id: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(user_id, event_type, Timestamp::now(), Some(Metadata::new()))
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    // Setters store values verbatim: no trimming, no case folding, no checks.

    pub fn set_user_id(&mut self, user_id: impl Into<String>) -> &mut Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn set_event_type(&mut self, event_type: impl Into<String>) -> &mut Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn set_timestamp(&mut self, timestamp: Timestamp) -> &mut Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn set_metadata(&mut self, metadata: Metadata) -> &mut Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn clear_metadata(&mut self) -> &mut Self {
        self.metadata = None;
        self
    }

    /// Validates the current values into an immutable event.
    pub fn build(&self) -> Result<UserEvent, ValidationError> {
        UserEvent::try_from(EventFields::from(self.clone()))
    }
}

impl TryFrom<EventFields> for UserEventDraft {
    type Error = ValidationError;

    fn try_from(fields: EventFields) -> Result<Self, Self::Error> {
        let NormalizedFields {
            user_id,
            event_type,
            timestamp,
            metadata,
        } = fields.validate()?;

        Ok(Self {
            user_id: Some(user_id),
            event_type: Some(event_type),
            timestamp: Some(timestamp),
            metadata,
        })
    }
}

impl From<UserEventDraft> for EventFields {
    fn from(draft: UserEventDraft) -> Self {
        EventFields {
            user_id: draft.user_id,
            event_type: draft.event_type,
            timestamp: draft.timestamp,
            metadata: draft.metadata,
        }
    }
}

impl From<UserEvent> for UserEventDraft {
    fn from(event: UserEvent) -> Self {
        Self {
            user_id: Some(event.user_id().to_string()),
            event_type: Some(event.event_type().to_string()),
            timestamp: Some(event.timestamp()),
            metadata: event.metadata().cloned(),
        }
    }
}

impl UserEventView for UserEventDraft {
    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn june_first() -> Timestamp {
        Timestamp::from_ymd_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    fn hash_of(draft: &UserEventDraft) -> u64 {
        let mut hasher = DefaultHasher::new();
        draft.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn default_draft_has_no_fields() {
        let draft = UserEventDraft::default();

        assert_eq!(draft.user_id(), None);
        assert_eq!(draft.event_type(), None);
        assert_eq!(draft.timestamp(), None);
        assert_eq!(draft.metadata(), None);
        assert!(!draft.is_login_event());
    }

    #[test]
    fn setters_populate_a_default_draft() {
        let mut draft = UserEventDraft::default();
        draft
            .set_user_id("setter-user")
            .set_event_type("SETTER_TEST")
            .set_timestamp(june_first())
            .set_metadata(Metadata::new().with("method", "setter"));

        assert_eq!(draft.user_id(), Some("setter-user"));
        assert_eq!(draft.event_type(), Some("SETTER_TEST"));
        assert_eq!(draft.timestamp(), Some(june_first()));
        assert_eq!(draft.metadata_value("method"), Some("setter".to_string()));

        let json = serde_json::to_string(&draft).unwrap();
        assert!(json.contains("setter-user"));
    }

    #[test]
    fn new_validates_like_the_immutable_event() {
        let draft = UserEventDraft::new("  bob ", "login", june_first(), None).unwrap();
        assert_eq!(draft.user_id(), Some("bob"));
        assert_eq!(draft.event_type(), Some("LOGIN"));

        let err = UserEventDraft::new("", "LOGIN", june_first(), None).unwrap_err();
        assert_eq!(err.field(), "userId");
    }

    #[test]
    fn setters_bypass_validation() {
        let mut draft = UserEventDraft::create_simple("bob", "LOGIN").unwrap();
        draft.set_user_id("   ").set_event_type("logout");

        assert_eq!(draft.user_id(), Some("   "));
        // Not normalized, so the derived check does not match.
        assert!(!draft.is_logout_event());
    }

    #[test]
    fn build_revalidates_current_values() {
        let mut draft = UserEventDraft::create_simple("bob", "LOGIN").unwrap();
        draft.set_event_type(" logout ");

        let event = draft.build().unwrap();
        assert_eq!(event.event_type(), "LOGOUT");

        draft.set_user_id("");
        assert_eq!(draft.build().unwrap_err().field(), "userId");
    }

    #[test]
    fn build_fails_on_default_draft() {
        let err = UserEventDraft::default().build().unwrap_err();
        assert_eq!(err.field(), "userId");
    }

    #[test]
    fn signed_zero_metadata_hashes_equal() {
        let mut negative = UserEventDraft::default();
        negative.set_metadata(Metadata::new().with("delta", -0.0));
        let mut positive = UserEventDraft::default();
        positive.set_metadata(Metadata::new().with("delta", 0.0));

        assert_eq!(negative, positive);
        assert_eq!(hash_of(&negative), hash_of(&positive));
    }

    #[test]
    fn mutation_changes_equality_and_hash() {
        let original = UserEventDraft::new("user1", "LOGIN", june_first(), None).unwrap();
        let mut copy = original.clone();

        assert_eq!(original, copy);
        assert_eq!(hash_of(&original), hash_of(&copy));

        copy.set_user_id("modified-user").set_event_type("MODIFIED_EVENT");

        assert_ne!(original, copy);
        assert_ne!(hash_of(&original), hash_of(&copy));
        assert_eq!(copy.user_id(), Some("modified-user"));
    }

    #[test]
    fn converts_from_immutable_event() {
        let event = UserEvent::new("bob", "LOGIN", june_first(), None).unwrap();
        let draft = UserEventDraft::from(event.clone());

        assert_eq!(draft.user_id(), Some("bob"));
        assert_eq!(draft.build().unwrap(), event);
    }

    #[test]
    fn shares_wire_format_with_immutable_event() {
        let metadata = Metadata::new().with("ip", "1.2.3.4");
        let event = UserEvent::new("bob", "LOGIN", june_first(), Some(metadata)).unwrap();
        let draft = UserEventDraft::from(event.clone());

        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            serde_json::to_value(&event).unwrap()
        );
    }

    #[test]
    fn unset_fields_serialize_as_null() {
        let json = serde_json::to_value(UserEventDraft::default()).unwrap();

        assert_eq!(
            json,
            json!({"userId": null, "eventType": null, "timestamp": null, "metadata": null})
        );
    }

    #[test]
    fn deserialization_goes_through_validation() {
        let draft: UserEventDraft = serde_json::from_str(
            r#"{"userId":"test-user-456","eventType":"logout","timestamp":"2024-01-01T15:30:00"}"#,
        )
        .unwrap();
        assert_eq!(draft.event_type(), Some("LOGOUT"));

        let result: Result<UserEventDraft, _> = serde_json::from_str(
            r#"{"userId":"test-user-456","eventType":" ","timestamp":"2024-01-01T15:30:00"}"#,
        );
        assert!(result.unwrap_err().to_string().contains("eventType"));
    }
}
