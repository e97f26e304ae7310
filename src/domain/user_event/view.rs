//! Read-only accessors shared by both event representations.

use super::Metadata;
use crate::domain::foundation::Timestamp;

/// Well-known event type names (already normalized).
pub mod event_types {
    pub const LOGIN: &str = "LOGIN";
    pub const LOGOUT: &str = "LOGOUT";
}

/// Field access plus derived checks for a user event.
///
/// Implementors only supply the raw getters; the derived checks are
/// identical for every representation. Getters return `Option` because a
/// mutable draft can legitimately hold unset fields.
pub trait UserEventView {
    fn user_id(&self) -> Option<&str>;

    fn event_type(&self) -> Option<&str>;

    fn timestamp(&self) -> Option<Timestamp>;

    fn metadata(&self) -> Option<&Metadata>;

    /// True iff the event type is exactly `LOGIN`.
    fn is_login_event(&self) -> bool {
        self.event_type() == Some(event_types::LOGIN)
    }

    /// True iff the event type is exactly `LOGOUT`.
    fn is_logout_event(&self) -> bool {
        self.event_type() == Some(event_types::LOGOUT)
    }

    /// String form of `metadata[key]`.
    ///
    /// `None` when there is no metadata or the key is absent.
    fn metadata_value(&self, key: &str) -> Option<String> {
        self.metadata()?.value_as_string(key)
    }
}
