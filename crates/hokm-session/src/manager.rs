//! Session manager: tracks which players are currently connected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use hokm_protocol::PlayerId;

use crate::{Session, SessionError};

/// Counter for guest identities handed to token-less connections.
/// Starts high so guest IDs never collide with authenticated ones.
static NEXT_GUEST_ID: AtomicU64 = AtomicU64::new(1_000_000);

/// Tracks all live sessions, one per connected player.
///
/// The manager is plain data behind the server's lock; it does no I/O.
/// Everything async (authenticating tokens, the connections themselves)
/// happens before or after these calls.
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Opens a session for an authenticated player.
    ///
    /// One session per player: a second connection handshaking with the
    /// same identity is refused while the first is alive.
    pub fn connect(&mut self, player_id: PlayerId) -> Result<(), SessionError> {
        if self.sessions.contains_key(&player_id) {
            return Err(SessionError::AlreadyConnected(player_id));
        }
        self.sessions.insert(player_id, Session::new(player_id));
        tracing::info!(%player_id, sessions = self.sessions.len(), "session opened");
        Ok(())
    }

    /// Opens a session under a freshly allocated guest identity, for
    /// handshakes that carry no token.
    pub fn connect_guest(&mut self) -> PlayerId {
        let player_id = PlayerId(NEXT_GUEST_ID.fetch_add(1, Ordering::Relaxed));
        self.sessions.insert(player_id, Session::new(player_id));
        tracing::info!(%player_id, sessions = self.sessions.len(), "guest session opened");
        player_id
    }

    /// Closes a player's session.
    pub fn disconnect(&mut self, player_id: PlayerId) -> Result<(), SessionError> {
        let session = self
            .sessions
            .remove(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        tracing::info!(
            %player_id,
            duration_secs = session.connected_at.elapsed().as_secs(),
            sessions = self.sessions.len(),
            "session closed"
        );
        Ok(())
    }

    pub fn is_connected(&self, player_id: PlayerId) -> bool {
        self.sessions.contains_key(&player_id)
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&Session> {
        self.sessions.get(&player_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_then_disconnect() {
        let mut mgr = SessionManager::new();
        mgr.connect(PlayerId(1)).unwrap();
        assert!(mgr.is_connected(PlayerId(1)));
        assert_eq!(mgr.len(), 1);

        mgr.disconnect(PlayerId(1)).unwrap();
        assert!(!mgr.is_connected(PlayerId(1)));
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_second_session_for_same_player_is_refused() {
        let mut mgr = SessionManager::new();
        mgr.connect(PlayerId(1)).unwrap();
        let err = mgr.connect(PlayerId(1)).unwrap_err();
        assert!(matches!(err, SessionError::AlreadyConnected(PlayerId(1))));
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn test_disconnect_unknown_player_is_not_found() {
        let mut mgr = SessionManager::new();
        let err = mgr.disconnect(PlayerId(5)).unwrap_err();
        assert!(matches!(err, SessionError::NotFound(PlayerId(5))));
    }

    #[test]
    fn test_guest_ids_are_distinct_and_out_of_band() {
        let mut mgr = SessionManager::new();
        let a = mgr.connect_guest();
        let b = mgr.connect_guest();
        assert_ne!(a, b);
        assert!(a.0 >= 1_000_000);
        assert!(mgr.is_connected(a));
        assert!(mgr.is_connected(b));
    }
}
