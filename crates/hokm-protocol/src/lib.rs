//! Wire protocol for the Hokm game server.
//!
//! This crate defines the language clients and the server speak:
//!
//! - **Types** ([`Card`], [`Player`], [`ClientMessage`], [`ServerMessage`],
//!   etc.) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing so.
//!
//! The protocol layer knows nothing about connections, sessions, or game
//! rules — it only describes shapes and their serialization.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Card, ClientMessage, Player, PlayerId, RANK_MAX, RANK_MIN, RoomId, RoomStateView,
    ServerMessage, Suit, Team, TeamScores, TrickPlay,
};
