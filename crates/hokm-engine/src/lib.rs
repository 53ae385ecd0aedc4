//! Hokm game engine and room runtime.
//!
//! The engine layers a pure state machine under an actor runtime. Each
//! room runs as an isolated Tokio task owning one [`HokmGame`]; the
//! command channel serializes all operations on a table.
//!
//! # Key types
//!
//! - [`HokmGame`] — the per-table state machine (no I/O, no tasks)
//! - [`Notifier`] — how the game announces events to players
//! - [`RoomRegistry`] — creates/deletes rooms, routes players
//! - [`RoomHandle`] — send commands to a running room actor

mod deck;
mod error;
mod game;
mod notifier;
mod registry;
mod room;
mod trick;

pub use deck::{shuffle, standard_deck, DECK_SIZE};
pub use error::RoomError;
pub use game::{HokmGame, NewPlayer, HAND_SIZE, SEATS};
pub use notifier::Notifier;
pub use registry::RoomRegistry;
pub use room::{spawn_room, PlayerSender, RoomHandle};
pub use trick::resolve_trick;
