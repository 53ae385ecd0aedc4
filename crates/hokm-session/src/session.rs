//! Session record: the server's view of one connected player.

use std::time::Instant;

use hokm_protocol::PlayerId;

/// A single player's live session.
///
/// Created when a connection completes its handshake, removed when the
/// connection closes. There is no reconnect grace period: a dropped
/// connection ends the session and releases the player's seat.
#[derive(Debug, Clone)]
pub struct Session {
    pub player_id: PlayerId,

    /// When the handshake completed. Only used for logging session
    /// duration at disconnect.
    pub connected_at: Instant,
}

impl Session {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            connected_at: Instant::now(),
        }
    }
}
