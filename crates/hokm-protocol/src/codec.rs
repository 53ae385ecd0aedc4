//! Codec trait and implementations for serializing messages.
//!
//! The rest of the stack never calls `serde_json` directly — it goes
//! through the [`Codec`] trait, so the wire encoding can be swapped
//! (e.g. for a compact binary format) without touching the handler or
//! transport code.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts between message types and raw bytes.
///
/// `Send + Sync + 'static` because the codec is shared across connection
/// handler tasks for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// `DeserializeOwned` so the result does not borrow from the input
    /// buffer, which is dropped right after decoding.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by JSON via `serde_json`.
///
/// Human-readable, which makes wire traffic easy to inspect during
/// development. Behind the `json` feature flag (enabled by default).
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Card, ClientMessage, RoomId, Suit};

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let msg = ClientMessage::PlayCard {
            room_id: RoomId(7),
            card: Card::new(Suit::Diamonds, 11),
        };
        let bytes = codec.encode(&msg).unwrap();
        let decoded: ClientMessage = codec.decode(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_json_codec_decode_error() {
        let codec = JsonCodec;
        let result: Result<ClientMessage, _> = codec.decode(b"{{{");
        assert!(result.is_err());
    }
}
