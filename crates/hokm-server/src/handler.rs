//! Per-connection handler: handshake, auth, and message routing.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Receive Handshake → validate version
//!   2. Authenticate token (or allocate a guest identity) → `PlayerId`
//!   3. Send Welcome → player is connected
//!   4. Split: a writer task pumps the player's outbound channel while
//!      this task decodes and dispatches inbound messages
//!
//! The outbound channel is the same one the player's room broadcasts
//! into, so direct replies and room notifications stay in one ordered
//! stream.

use std::sync::Arc;
use std::time::Duration;

use hokm_engine::{NewPlayer, RoomError};
use hokm_protocol::{
    ClientMessage, Codec, JsonCodec, PlayerId, ProtocolError, RoomId, ServerMessage,
};
use hokm_session::Authenticator;
use hokm_transport::{WsConnection, WsReceiver, WsSender};
use tokio::sync::mpsc;

use crate::server::{ServerState, PROTOCOL_VERSION};
use crate::ServerError;

/// How long a connection may sit idle before it is dropped.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// How long a fresh connection has to complete the handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Maps a room error to the HTTP-flavored code sent on the wire.
fn error_code(err: &RoomError) -> u16 {
    match err {
        RoomError::RoomNotFound(_) => 404,
        RoomError::RoomFull(_)
        | RoomError::AlreadyStarted(_)
        | RoomError::AlreadyDeclared(_)
        | RoomError::AlreadyInRoom(..) => 409,
        RoomError::NotYourTurn(_)
        | RoomError::CardNotInHand(..)
        | RoomError::NotInRoom(..)
        | RoomError::InvalidState(_) => 400,
        RoomError::Unavailable(_) => 503,
    }
}

/// JSON is UTF-8; this just moves the bytes into a text frame.
fn encode_text(codec: &JsonCodec, msg: &ServerMessage) -> Result<String, ProtocolError> {
    let bytes = codec.encode(msg)?;
    String::from_utf8(bytes).map_err(|e| ProtocolError::InvalidMessage(e.to_string()))
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A: Authenticator>(
    conn: WsConnection,
    state: Arc<ServerState<A>>,
) -> Result<(), ServerError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");
    let (mut tx, mut rx) = conn.split();

    let player_id = match perform_handshake(&mut tx, &mut rx, &state).await {
        Ok(player_id) => player_id,
        Err(e) => {
            let _ = tx.close().await;
            return Err(e);
        }
    };
    tracing::info!(%conn_id, %player_id, "player connected");

    // Writer task: everything addressed to this player funnels through
    // one unbounded channel, whether it is a direct reply or a room
    // broadcast.
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let codec = state.codec;
    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let text = match encode_text(&codec, &msg) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode outbound message");
                    continue;
                }
            };
            if tx.send_text(text).await.is_err() {
                break;
            }
        }
        let _ = tx.close().await;
    });

    let result = message_loop(&mut rx, &state, player_id, &outbound).await;

    // Cleanup runs for every exit path: the session is closed and the
    // seat released whether the client said goodbye or just vanished.
    // Session first, so the identity is reusable by the time the room
    // broadcasts the departure.
    if let Err(e) = state.sessions.lock().await.disconnect(player_id) {
        tracing::warn!(%player_id, error = %e, "failed to close session");
    }
    {
        let mut rooms = state.rooms.lock().await;
        if rooms.player_room(player_id).is_some() {
            if let Err(e) = rooms.leave(player_id).await {
                tracing::warn!(%player_id, error = %e, "failed to release seat");
            }
        }
    }

    drop(outbound);
    let _ = writer.await;
    tracing::info!(%conn_id, %player_id, "player disconnected");
    result
}

/// Performs the initial handshake: receive Handshake, validate, auth,
/// send Welcome.
async fn perform_handshake<A: Authenticator>(
    tx: &mut WsSender,
    rx: &mut WsReceiver,
    state: &Arc<ServerState<A>>,
) -> Result<PlayerId, ServerError> {
    let text = match tokio::time::timeout(HANDSHAKE_TIMEOUT, rx.recv_text()).await {
        Ok(Ok(Some(text))) => text,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage(
                "connection closed before handshake".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(ProtocolError::InvalidMessage("handshake timed out".into()).into());
        }
    };

    let msg: ClientMessage = state.codec.decode(text.as_bytes())?;
    let ClientMessage::Handshake { version, token } = msg else {
        send_direct(tx, state, 400, "first message must be Handshake").await?;
        return Err(ProtocolError::InvalidMessage("first message must be Handshake".into()).into());
    };

    if version != PROTOCOL_VERSION {
        let detail = format!("version mismatch: expected {PROTOCOL_VERSION}, got {version}");
        send_direct(tx, state, 400, &detail).await?;
        return Err(ProtocolError::InvalidMessage(detail).into());
    }

    let player_id = match token {
        Some(token) => {
            let player_id = match state.auth.authenticate(&token).await {
                Ok(player_id) => player_id,
                Err(e) => {
                    send_direct(tx, state, 401, "unauthorized").await?;
                    return Err(e.into());
                }
            };
            if let Err(e) = state.sessions.lock().await.connect(player_id) {
                send_direct(tx, state, 409, &e.to_string()).await?;
                return Err(e.into());
            }
            player_id
        }
        // Token-less handshakes get a throwaway guest identity.
        None => state.sessions.lock().await.connect_guest(),
    };

    let welcome = encode_text(&state.codec, &ServerMessage::Welcome { player_id })?;
    tx.send_text(welcome).await?;
    Ok(player_id)
}

/// Sends an error straight down the socket, for use before the writer
/// task exists.
async fn send_direct<A: Authenticator>(
    tx: &mut WsSender,
    state: &Arc<ServerState<A>>,
    code: u16,
    message: &str,
) -> Result<(), ServerError> {
    let text = encode_text(
        &state.codec,
        &ServerMessage::Error {
            code,
            message: message.to_string(),
        },
    )?;
    tx.send_text(text).await?;
    Ok(())
}

/// Decodes and dispatches messages until the client leaves or times out.
async fn message_loop<A: Authenticator>(
    rx: &mut WsReceiver,
    state: &Arc<ServerState<A>>,
    player_id: PlayerId,
    outbound: &mpsc::UnboundedSender<ServerMessage>,
) -> Result<(), ServerError> {
    loop {
        let text = match tokio::time::timeout(IDLE_TIMEOUT, rx.recv_text()).await {
            Ok(Ok(Some(text))) => text,
            Ok(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                return Ok(());
            }
            Err(_) => {
                tracing::info!(%player_id, "connection timed out");
                return Ok(());
            }
        };

        let msg: ClientMessage = match state.codec.decode(text.as_bytes()) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode message");
                send_error(outbound, 400, "malformed message");
                continue;
            }
        };

        if dispatch(state, player_id, outbound, msg).await? {
            return Ok(());
        }
    }
}

/// Handles one client message. Returns `true` when the connection
/// should close.
async fn dispatch<A: Authenticator>(
    state: &Arc<ServerState<A>>,
    player_id: PlayerId,
    outbound: &mpsc::UnboundedSender<ServerMessage>,
    msg: ClientMessage,
) -> Result<bool, ServerError> {
    match msg {
        ClientMessage::Handshake { .. } => {
            send_error(outbound, 400, "already connected");
        }

        ClientMessage::CreateRoom { name } => {
            let result = {
                let mut rooms = state.rooms.lock().await;
                rooms
                    .create_room(
                        NewPlayer {
                            id: player_id,
                            name,
                        },
                        outbound.clone(),
                    )
                    .await
            };
            match result {
                Ok(room_id) => send(outbound, ServerMessage::RoomCreated { room_id }),
                Err(e) => send_room_error(outbound, player_id, &e),
            }
        }

        ClientMessage::JoinRoom { room_id, name } => {
            let result = {
                let mut rooms = state.rooms.lock().await;
                rooms
                    .join_room(
                        room_id,
                        NewPlayer {
                            id: player_id,
                            name,
                        },
                        outbound.clone(),
                    )
                    .await
            };
            match result {
                Ok(()) => send(outbound, ServerMessage::RoomJoined { room_id }),
                Err(e) => send_room_error(outbound, player_id, &e),
            }
        }

        ClientMessage::StartGame { room_id } => {
            let result = in_room(state, player_id, room_id).await;
            let result = match result {
                Ok(()) => state.rooms.lock().await.start_game(player_id).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                send_room_error(outbound, player_id, &e);
            }
        }

        ClientMessage::DeclareTrump { room_id, suit } => {
            let result = match in_room(state, player_id, room_id).await {
                Ok(()) => {
                    state
                        .rooms
                        .lock()
                        .await
                        .declare_trump(player_id, suit)
                        .await
                }
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                send_room_error(outbound, player_id, &e);
            }
        }

        ClientMessage::PlayCard { room_id, card } => {
            let result = match in_room(state, player_id, room_id).await {
                Ok(()) => state.rooms.lock().await.play_card(player_id, card).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                send_room_error(outbound, player_id, &e);
            }
        }

        ClientMessage::GetRoomState { room_id } => {
            let result = match in_room(state, player_id, room_id).await {
                Ok(()) => state.rooms.lock().await.room_state(player_id).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(view) => send(outbound, ServerMessage::RoomState { view }),
                Err(e) => send_room_error(outbound, player_id, &e),
            }
        }

        ClientMessage::GetHand { room_id } => {
            let result = match in_room(state, player_id, room_id).await {
                Ok(()) => state.rooms.lock().await.hand(player_id).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(cards) => send(outbound, ServerMessage::Hand { cards }),
                Err(e) => send_room_error(outbound, player_id, &e),
            }
        }

        ClientMessage::LeaveRoom => {
            let result = state.rooms.lock().await.leave(player_id).await;
            if let Err(e) = result {
                send_room_error(outbound, player_id, &e);
            }
        }

        ClientMessage::Disconnect => {
            tracing::debug!(%player_id, "client requested disconnect");
            return Ok(true);
        }
    }
    Ok(false)
}

/// Checks that the room named in a request is the one the player is in.
async fn in_room<A: Authenticator>(
    state: &Arc<ServerState<A>>,
    player_id: PlayerId,
    room_id: RoomId,
) -> Result<(), RoomError> {
    match state.rooms.lock().await.player_room(player_id) {
        Some(current) if current == room_id => Ok(()),
        _ => Err(RoomError::NotInRoom(player_id, room_id)),
    }
}

fn send(outbound: &mpsc::UnboundedSender<ServerMessage>, msg: ServerMessage) {
    // A closed channel means the writer task is gone; the recv loop
    // will notice on its next read.
    let _ = outbound.send(msg);
}

fn send_error(outbound: &mpsc::UnboundedSender<ServerMessage>, code: u16, message: &str) {
    send(
        outbound,
        ServerMessage::Error {
            code,
            message: message.to_string(),
        },
    );
}

fn send_room_error(
    outbound: &mpsc::UnboundedSender<ServerMessage>,
    player_id: PlayerId,
    err: &RoomError,
) {
    tracing::debug!(%player_id, error = %err, "request rejected");
    send_error(outbound, error_code(err), &err.to_string());
}
