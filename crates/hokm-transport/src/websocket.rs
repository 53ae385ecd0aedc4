//! WebSocket transport built on `tokio-tungstenite`.
//!
//! The protocol is JSON over text frames, so the surface here is string
//! in, string out. An accepted connection splits into independent sender
//! and receiver halves: the receiver can sit in `recv_text().await` while
//! another task pushes outbound frames through the sender.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::{ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = WebSocketStream<TcpStream>;

fn io_wrap(kind: io::ErrorKind, e: tokio_tungstenite::tungstenite::Error) -> io::Error {
    io::Error::new(kind, e)
}

/// Listens for incoming WebSocket connections.
pub struct WsListener {
    listener: TcpListener,
}

impl WsListener {
    /// Binds to the given address. Use port 0 to let the OS pick one,
    /// then read it back with [`local_addr`](Self::local_addr).
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await.map_err(TransportError::Bind)?;
        tracing::info!(addr, "websocket listener bound");
        Ok(Self { listener })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener.local_addr().map_err(TransportError::Bind)
    }

    /// Waits for the next connection and completes its upgrade handshake.
    pub async fn accept(&mut self) -> Result<WsConnection, TransportError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Accept)?;

        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| {
                TransportError::Accept(io_wrap(io::ErrorKind::ConnectionRefused, e))
            })?;

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %peer, "accepted websocket connection");
        Ok(WsConnection { id, peer, ws })
    }
}

/// A single accepted WebSocket connection, not yet split.
pub struct WsConnection {
    id: ConnectionId,
    peer: SocketAddr,
    ws: WsStream,
}

impl WsConnection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Splits into independently owned sender and receiver halves.
    pub fn split(self) -> (WsSender, WsReceiver) {
        let (sink, stream) = self.ws.split();
        (
            WsSender { id: self.id, sink },
            WsReceiver {
                id: self.id,
                stream,
            },
        )
    }
}

/// The outbound half of a connection.
pub struct WsSender {
    id: ConnectionId,
    sink: SplitSink<WsStream, Message>,
}

impl WsSender {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Sends one text frame.
    pub async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| TransportError::Send(io_wrap(io::ErrorKind::BrokenPipe, e)))
    }

    /// Sends a close frame and flushes it.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.sink
            .send(Message::Close(None))
            .await
            .map_err(|e| TransportError::Send(io_wrap(io::ErrorKind::BrokenPipe, e)))
    }
}

/// The inbound half of a connection.
pub struct WsReceiver {
    id: ConnectionId,
    stream: SplitStream<WsStream>,
}

impl WsReceiver {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Receives the next text payload.
    ///
    /// Binary frames carrying valid UTF-8 are accepted too; control
    /// frames are skipped. Returns `Ok(None)` once the peer closes.
    pub async fn recv_text(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            return match self.stream.next().await {
                None | Some(Ok(Message::Close(_))) => Ok(None),
                Some(Ok(msg @ (Message::Text(_) | Message::Binary(_)))) => {
                    let text = msg.into_text().map_err(|e| {
                        TransportError::Receive(io_wrap(io::ErrorKind::InvalidData, e))
                    })?;
                    Ok(Some(text.to_string()))
                }
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => Err(TransportError::Receive(io_wrap(
                    io::ErrorKind::ConnectionReset,
                    e,
                ))),
            };
        }
    }
}
