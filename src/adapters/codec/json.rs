//! JSON codec backed by serde_json.
//!
//! Decoding deserializes straight into the event type, so for
//! [`UserEvent`](crate::domain::user_event::UserEvent) and
//! [`UserEventDraft`](crate::domain::user_event::UserEventDraft) every
//! payload passes through the validating constructor.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ports::{EventCodec, TransportError};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Codec producing the camelCase JSON wire format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl<E> EventCodec<E> for JsonCodec
where
    E: Serialize + DeserializeOwned,
{
    fn encode(&self, event: &E) -> Result<Vec<u8>, TransportError> {
        serde_json::to_vec(event).map_err(|e| TransportError::Encode {
            type_name: std::any::type_name::<E>(),
            cause: e.to_string(),
        })
    }

    fn decode(&self, payload: &[u8]) -> Result<E, TransportError> {
        serde_json::from_slice(payload).map_err(|e| TransportError::Decode {
            cause: e.to_string(),
        })
    }

    fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }
}
