//! Room registry: creates, tracks, and routes players to rooms.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use hokm_protocol::{Card, PlayerId, RoomId, RoomStateView, Suit};

use crate::game::NewPlayer;
use crate::room::{spawn_room, PlayerSender, RoomHandle};
use crate::RoomError;

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// Tracks all active rooms and which player sits in which room.
///
/// This is the entry point for room operations from the connection
/// handlers. A player can be in at most ONE room at a time; the
/// `player_rooms` index enforces that and makes disconnect cleanup a
/// lookup instead of a scan over every room.
pub struct RoomRegistry {
    /// Active rooms, keyed by room ID.
    rooms: HashMap<RoomId, RoomHandle>,

    /// Maps each player to the room they're currently in.
    player_rooms: HashMap<PlayerId, RoomId>,
}

impl RoomRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
        }
    }

    /// Creates a room with `player` as its first occupant.
    ///
    /// A room never exists without players, so creation and the first
    /// join are one operation.
    pub async fn create_room(
        &mut self,
        player: NewPlayer,
        sender: PlayerSender,
    ) -> Result<RoomId, RoomError> {
        if let Some(current) = self.player_rooms.get(&player.id) {
            return Err(RoomError::AlreadyInRoom(player.id, *current));
        }

        let room_id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let handle = spawn_room(room_id);
        let player_id = player.id;
        handle.join(player, sender).await?;
        self.rooms.insert(room_id, handle);
        self.player_rooms.insert(player_id, room_id);
        tracing::info!(%room_id, creator = %player_id, "room created");
        Ok(room_id)
    }

    /// Seats a player in an existing room.
    pub async fn join_room(
        &mut self,
        room_id: RoomId,
        player: NewPlayer,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        if let Some(current) = self.player_rooms.get(&player.id) {
            return Err(RoomError::AlreadyInRoom(player.id, *current));
        }

        let handle = self
            .rooms
            .get(&room_id)
            .ok_or(RoomError::RoomNotFound(room_id))?;

        let player_id = player.id;
        handle.join(player, sender).await?;
        self.player_rooms.insert(player_id, room_id);
        Ok(())
    }

    /// Removes a player from their current room. When the last player
    /// leaves, the room is deleted.
    pub async fn leave(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        let Some(room_id) = self.player_rooms.get(&player_id).copied() else {
            return Err(RoomError::InvalidState(format!(
                "player {player_id} is not in any room"
            )));
        };

        if let Some(handle) = self.rooms.get(&room_id) {
            let remaining = handle.leave(player_id).await?;
            if remaining == 0 {
                self.rooms.remove(&room_id);
                tracing::info!(%room_id, "room deleted");
            }
        }

        self.player_rooms.remove(&player_id);
        Ok(())
    }

    fn room_of(&self, player_id: PlayerId) -> Result<&RoomHandle, RoomError> {
        let room_id = self
            .player_rooms
            .get(&player_id)
            .ok_or_else(|| {
                RoomError::InvalidState(format!("player {player_id} is not in any room"))
            })?;
        self.rooms
            .get(room_id)
            .ok_or(RoomError::RoomNotFound(*room_id))
    }

    /// Deals and starts the game in the player's room.
    pub async fn start_game(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.room_of(player_id)?.start().await
    }

    /// Declares trump in the player's room.
    pub async fn declare_trump(
        &self,
        player_id: PlayerId,
        suit: Suit,
    ) -> Result<(), RoomError> {
        self.room_of(player_id)?.declare_trump(player_id, suit).await
    }

    /// Plays a card in the player's room.
    pub async fn play_card(&self, player_id: PlayerId, card: Card) -> Result<(), RoomError> {
        self.room_of(player_id)?.play_card(player_id, card).await
    }

    /// Public snapshot of the player's room.
    pub async fn room_state(&self, player_id: PlayerId) -> Result<RoomStateView, RoomError> {
        self.room_of(player_id)?.get_state().await
    }

    /// The player's own hand.
    pub async fn hand(&self, player_id: PlayerId) -> Result<Vec<Card>, RoomError> {
        self.room_of(player_id)?.get_hand(player_id).await
    }

    /// The room ID a player is currently in, if any.
    pub fn player_room(&self, player_id: PlayerId) -> Option<RoomId> {
        self.player_rooms.get(&player_id).copied()
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
