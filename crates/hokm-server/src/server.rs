//! `HokmServer` builder and accept loop.
//!
//! This ties the layers together: transport → protocol → session →
//! rooms. One handler task per accepted connection; the room actors do
//! the rest.

use std::sync::Arc;

use hokm_engine::RoomRegistry;
use hokm_protocol::JsonCodec;
use hokm_session::{Authenticator, SessionManager};
use hokm_transport::WsListener;
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::ServerError;

/// The current protocol version. Clients must send this in their
/// handshake or be rejected.
pub const PROTOCOL_VERSION: u32 = 1;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The two
/// locks cover the registries only; room operations themselves run in
/// the room actors, outside any lock.
pub(crate) struct ServerState<A: Authenticator> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) auth: A,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Hokm server.
pub struct HokmServerBuilder {
    bind_addr: String,
}

impl HokmServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind to. Port 0 picks a free port.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener and assembles the server with the given
    /// authenticator.
    pub async fn build<A: Authenticator>(
        self,
        auth: A,
    ) -> Result<HokmServer<A>, ServerError> {
        let listener = WsListener::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new()),
            rooms: Mutex::new(RoomRegistry::new()),
            auth,
            codec: JsonCodec,
        });

        Ok(HokmServer { listener, state })
    }
}

impl Default for HokmServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Hokm game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct HokmServer<A: Authenticator> {
    listener: WsListener,
    state: Arc<ServerState<A>>,
}

impl<A: Authenticator> HokmServer<A> {
    pub fn builder() -> HokmServerBuilder {
        HokmServerBuilder::new()
    }

    /// The address the listener actually bound.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// Each accepted connection gets its own handler task; a connection
    /// failing never takes the accept loop down with it.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("hokm server running");

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
