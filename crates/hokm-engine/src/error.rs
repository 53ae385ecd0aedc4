//! Error types for the room engine.
//!
//! Every variant describes an invalid client request, not a system
//! fault — the operation is rejected without mutating room state and
//! the error is reported back to the acting client only.

use hokm_protocol::{Card, PlayerId, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// All four seats are taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The game has already been dealt and started.
    #[error("game in room {0} already started")]
    AlreadyStarted(RoomId),

    /// Trump has already been declared for this deal.
    #[error("trump already declared in room {0}")]
    AlreadyDeclared(RoomId),

    /// It is not this player's turn to play.
    #[error("not {0}'s turn")]
    NotYourTurn(PlayerId),

    /// The player tried to play a card they do not hold.
    #[error("{0} does not hold {1}")]
    CardNotInHand(PlayerId, Card),

    /// The player is already seated in this room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// The player is not seated in this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// The room is in a state that doesn't allow this operation.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The room's command channel is closed — the actor is gone.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
