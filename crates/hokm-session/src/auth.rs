//! Authentication hook for validating player identity.
//!
//! The server does not implement authentication itself. It defines the
//! [`Authenticator`] trait — one async method from handshake token to
//! `PlayerId` — and calls it when a connection presents a token. The
//! bundled [`GuestAuthenticator`] accepts numeric tokens, which is all a
//! development or LAN deployment needs; a real deployment substitutes a
//! JWT or API-backed implementation.

use hokm_protocol::PlayerId;

use crate::SessionError;

/// Validates a client's handshake token and returns their identity.
///
/// `Send + Sync + 'static` because the authenticator is shared across
/// connection tasks for the lifetime of the server.
pub trait Authenticator: Send + Sync + 'static {
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<PlayerId, SessionError>> + Send;
}

/// Accepts any numeric token and uses it as the player ID.
///
/// For development and tests only — it proves nothing about who the
/// client is. A real deployment implements [`Authenticator`] against a
/// token service:
///
/// ```rust
/// use hokm_session::{Authenticator, SessionError};
/// use hokm_protocol::PlayerId;
///
/// struct ApiKeyAuthenticator { expected: String }
///
/// impl Authenticator for ApiKeyAuthenticator {
///     async fn authenticate(&self, token: &str) -> Result<PlayerId, SessionError> {
///         if token != self.expected {
///             return Err(SessionError::AuthFailed("unknown key".into()));
///         }
///         Ok(PlayerId(1))
///     }
/// }
/// ```
pub struct GuestAuthenticator;

impl Authenticator for GuestAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<PlayerId, SessionError> {
        let id: u64 = token
            .trim()
            .parse()
            .map_err(|_| SessionError::AuthFailed("token must be a number".into()))?;
        if id == 0 {
            return Err(SessionError::AuthFailed("player id 0 is reserved".into()));
        }
        Ok(PlayerId(id))
    }
}
