//! User activity events.
//!
//! Two representations of the same record:
//!
//! - `UserEvent` - immutable value, fixed at construction
//! - `UserEventDraft` - mutable working copy with unchecked setters
//!
//! Both are built through `EventFields`, share the `UserEventView`
//! accessors and use the same JSON wire format:
//!
//! ```json
//! {"userId": "bob", "eventType": "LOGIN", "timestamp": "2024-01-01T12:00:00", "metadata": {"ip": "1.2.3.4"}}
//! ```

mod draft;
mod event;
mod fields;
mod metadata;
mod view;


pub use draft::UserEventDraft;
pub use event::UserEvent;
pub use fields::{EventFields, EVENT_TYPE_FIELD, TIMESTAMP_FIELD, USER_ID_FIELD};
pub use metadata::Metadata;
pub use view::{event_types, UserEventView};
