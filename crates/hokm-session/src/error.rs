//! Error types for the session layer.

use hokm_protocol::PlayerId;

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The handshake token was invalid or rejected by the
    /// [`Authenticator`](crate::Authenticator).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// No session exists for the given player.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// The player already has an active session. One connection per
    /// player; a second handshake with the same identity is refused.
    #[error("player {0} already has an active session")]
    AlreadyConnected(PlayerId),
}
