//! Core wire types for the Hokm protocol.
//!
//! Everything that travels between client and server is defined here:
//! identities, cards, the room state snapshot, and the two message enums.
//! The JSON shapes are fixed by these serde attributes — the client SDK
//! parses them byte-for-byte, so changing a tag or rename is a breaking
//! protocol change.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Newtype over `u64` so a `PlayerId` can never be confused with a
/// `RoomId` in a signature. `#[serde(transparent)]` keeps the JSON a
/// plain number: `PlayerId(42)` serializes as `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a room (one table of four players).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// The four suits of a standard deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    /// All four suits, in a fixed order (used for deck building).
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    /// The Unicode symbol for this suit.
    pub fn symbol(&self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Lowest rank in a standard deck (the two).
pub const RANK_MIN: u8 = 2;
/// Highest rank in a standard deck (the ace).
pub const RANK_MAX: u8 = 14;

/// A playing card: a (suit, rank) pair with no further identity.
///
/// Ranks run 2..=14 where 11 = Jack, 12 = Queen, 13 = King, 14 = Ace.
/// The numeric encoding makes trick comparison a plain integer compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: u8,
}

impl Card {
    pub fn new(suit: Suit, rank: u8) -> Self {
        Self { suit, rank }
    }

    /// Whether this card exists in a standard 52-card deck.
    ///
    /// Wire input is not trusted: a client can send any `u8` as a rank.
    /// An out-of-range card can never be in a dealt hand, so the engine
    /// rejects it the same way as any other card the player doesn't hold.
    pub fn is_standard(&self) -> bool {
        (RANK_MIN..=RANK_MAX).contains(&self.rank)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank {
            11 => write!(f, "J{}", self.suit),
            12 => write!(f, "Q{}", self.suit),
            13 => write!(f, "K{}", self.suit),
            14 => write!(f, "A{}", self.suit),
            r => write!(f, "{}{}", r, self.suit),
        }
    }
}

// ---------------------------------------------------------------------------
// Players and teams
// ---------------------------------------------------------------------------

/// One of the two fixed partnerships at a table.
///
/// Seats alternate teams: seats 0 and 2 are team A, seats 1 and 3 are
/// team B, so partners always sit across from each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    /// Team for the player seated at `seat` (0-indexed join order).
    pub fn for_seat(seat: usize) -> Self {
        if seat % 2 == 0 { Team::A } else { Team::B }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::A => write!(f, "A"),
            Team::B => write!(f, "B"),
        }
    }
}

/// A seated player. Immutable once the game has started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: Team,
}

/// Tricks won per team this deal. Monotonically non-decreasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScores {
    #[serde(rename = "A")]
    pub team_a: u8,
    #[serde(rename = "B")]
    pub team_b: u8,
}

impl TeamScores {
    /// Awards one trick to the given team.
    pub fn award(&mut self, team: Team) {
        match team {
            Team::A => self.team_a += 1,
            Team::B => self.team_b += 1,
        }
    }

    /// Total tricks resolved so far (13 at the end of a full deal).
    pub fn total(&self) -> u8 {
        self.team_a + self.team_b
    }
}

// ---------------------------------------------------------------------------
// Room state snapshot
// ---------------------------------------------------------------------------

/// One card played into the current trick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickPlay {
    pub player_id: PlayerId,
    pub card: Card,
}

/// A public snapshot of a room, safe to send to any member.
///
/// Hands are deliberately absent — a player only ever sees their own
/// hand, via [`ServerMessage::Hand`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStateView {
    pub room_id: RoomId,
    pub players: Vec<Player>,
    pub started: bool,
    pub trump: Option<Suit>,
    /// Whose card is expected next. `None` until trump is declared.
    pub turn: Option<PlayerId>,
    pub trick: Vec<TrickPlay>,
    pub team_scores: TeamScores,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Messages a client sends to the server.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
/// `{ "type": "PlayCard", "room_id": 3, "card": { ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// First message on every connection. `token` identifies the player
    /// to the server's authenticator.
    Handshake { version: u32, token: Option<String> },

    /// Create a fresh room with the sender seated first, on team A.
    CreateRoom { name: String },

    /// Join an existing room.
    JoinRoom { room_id: RoomId, name: String },

    /// Explicitly deal and start. Normally unnecessary — the 4th join
    /// starts the game automatically.
    StartGame { room_id: RoomId },

    /// Declare the trump suit for this deal.
    DeclareTrump { room_id: RoomId, suit: Suit },

    /// Play a card from hand into the current trick.
    PlayCard { room_id: RoomId, card: Card },

    /// Leave the current room.
    LeaveRoom,

    /// Request a public snapshot of a room.
    GetRoomState { room_id: RoomId },

    /// Request the sender's own hand.
    GetHand { room_id: RoomId },

    /// Client is going away; the server releases the seat.
    Disconnect,
}

/// Messages the server sends to clients.
///
/// The game notifications (`PlayerJoined` through `TrickWon`) go to every
/// member of one room, except `ChosenToDeclare`, which goes only to the
/// chosen player. The rest are direct replies to the requesting client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Handshake accepted; this is who the server thinks you are.
    Welcome { player_id: PlayerId },

    /// Reply to `CreateRoom`.
    RoomCreated { room_id: RoomId },

    /// Reply to `JoinRoom`.
    RoomJoined { room_id: RoomId },

    /// A player took a seat in your room.
    PlayerJoined { player: Player },

    /// A player left your room (or dropped their connection).
    PlayerLeft { player_id: PlayerId },

    /// You were chosen to declare trump for this deal.
    ChosenToDeclare { player_id: PlayerId },

    /// Trump is set for the deal.
    TrumpDeclared { suit: Suit },

    /// It is this player's turn to play a card.
    TurnStarted { player_id: PlayerId },

    /// A card was played into the current trick.
    CardPlayed { player_id: PlayerId, card: Card },

    /// A trick resolved; the winner leads the next one.
    TrickWon { winner_id: PlayerId, team_scores: TeamScores },

    /// Reply to `GetRoomState`.
    RoomState { view: RoomStateView },

    /// Reply to `GetHand`.
    Hand { cards: Vec<Card> },

    /// Something went wrong. `code` follows HTTP conventions
    /// (400 bad request, 404 not found, 409 conflict).
    Error { code: u16, message: String },
}

// =========================================================================
// Tests
// =========================================================================
