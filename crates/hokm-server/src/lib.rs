//! WebSocket server for four-player Hokm.
//!
//! Assembles the stack: `hokm-transport` accepts connections,
//! `hokm-session` establishes who is behind each one, and `hokm-engine`
//! runs the rooms. See [`HokmServer`] for the entry point.

mod error;
mod handler;
mod server;

pub use error::ServerError;
pub use server::{HokmServer, HokmServerBuilder, PROTOCOL_VERSION};
