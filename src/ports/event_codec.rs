//! EventCodec port - Interface for turning events into channel payloads.

use super::TransportError;

/// Encodes events to bytes and decodes them back.
///
/// Decoding must go through the event's validating constructor, so a
/// payload that decodes is always a valid event.
pub trait EventCodec<E>: Send + Sync {
    fn encode(&self, event: &E) -> Result<Vec<u8>, TransportError>;

    fn decode(&self, payload: &[u8]) -> Result<E, TransportError>;

    /// MIME type of the payloads this codec produces.
    fn content_type(&self) -> &'static str;
}
