//! EventSubscriber port - Interface for application code that reacts to events.
//!
//! Handlers receive fully decoded, validated events together with the
//! delivery metadata of the message they arrived in.

use async_trait::async_trait;

use super::DeliveryMetadata;
use crate::domain::foundation::DomainError;

/// Handler for processing decoded events.
///
/// Implementations should be:
/// - **Idempotent** - Brokers deliver at-least-once
/// - **Quick** - Long operations should be queued for async processing
/// - **Isolated** - Errors are logged by the consumer and never stop it
///
/// # Example
///
/// ```ignore
/// struct AuditTrail { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler<UserEvent> for AuditTrail {
///     async fn handle(
///         &self,
///         event: UserEvent,
///         delivery: &DeliveryMetadata,
///     ) -> Result<(), DomainError> {
///         // Record the event...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "AuditTrail"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler<E: Send + 'static>: Send + Sync {
    /// Process one event.
    async fn handle(&self, event: E, delivery: &DeliveryMetadata) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user_event::{UserEvent, UserEventDraft};

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_handler_object_safe(_: &dyn EventHandler<UserEvent>) {}

    #[allow(dead_code)]
    fn assert_draft_handler_object_safe(_: &dyn EventHandler<UserEventDraft>) {}

    // Compile-time check that traits are Send + Sync
    #[allow(dead_code)]
    fn assert_send_sync<T: Send + Sync + ?Sized>() {}

    #[test]
    fn event_handler_is_send_sync() {
        assert_send_sync::<dyn EventHandler<UserEvent>>();
    }
}
