//! Unified error type for the server binary and its handlers.

use hokm_engine::RoomError;
use hokm_protocol::ProtocolError;
use hokm_session::SessionError;
use hokm_transport::TransportError;

/// Top-level error wrapping each layer's error type.
///
/// The `#[from]` attributes let `?` convert layer errors automatically,
/// so the handler reads as straight-line code.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (auth, duplicate connection).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (full, not found, bad play).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use hokm_protocol::{PlayerId, RoomId};

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Protocol(_)));
        assert!(server_err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::AuthFailed("nope".into());
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Session(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotYourTurn(PlayerId(3));
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Room(_)));

        let err = RoomError::RoomNotFound(RoomId(1));
        assert!(ServerError::from(err).to_string().contains("R-1"));
    }
}
