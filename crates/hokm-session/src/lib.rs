//! Player identity and session tracking for the Hokm server.
//!
//! This crate answers two questions at the edge of the server:
//!
//! 1. **Who is this connection?** — the [`Authenticator`] trait, called
//!    during the handshake ([`GuestAuthenticator`] for development)
//! 2. **Who is connected right now?** — the [`SessionManager`], which
//!    enforces one live session per player
//!
//! Rooms sit above this layer and never see tokens, only `PlayerId`s.

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod manager;
mod session;

pub use auth::{Authenticator, GuestAuthenticator};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::Session;
