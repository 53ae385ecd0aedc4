//! Room actor: an isolated Tokio task that owns one [`HokmGame`].
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. That channel is the room's mutual exclusion:
//! commands are applied one at a time in arrival order, so two players
//! can never interleave halfway through a play.

use std::collections::HashMap;

use hokm_protocol::{Card, Player, PlayerId, RoomId, RoomStateView, ServerMessage, Suit};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};

use crate::game::{HokmGame, NewPlayer};
use crate::{Notifier, RoomError};

/// Channel sender for delivering outbound messages to a player.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a room actor through its channel.
///
/// Each variant is one operation the outside world can request. The
/// `oneshot::Sender` is the reply channel the caller waits on.
pub(crate) enum RoomCommand {
    /// Seat a player and register their outbound channel.
    Join {
        player: NewPlayer,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Unseat a player. Replies with the number of seats still taken.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    /// Deal and start without waiting for a fourth seat to fill itself.
    Start {
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Declare the trump suit for this deal.
    DeclareTrump {
        player_id: PlayerId,
        suit: Suit,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Play a card into the current trick.
    PlayCard {
        player_id: PlayerId,
        card: Card,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Request the public room snapshot.
    GetState {
        reply: oneshot::Sender<RoomStateView>,
    },

    /// Request a player's own hand.
    GetHand {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<Vec<Card>, RoomError>>,
    },

    /// Shut down the room.
    Shutdown,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone — it's just an `mpsc::Sender` wrapper. The
/// `RoomRegistry` holds one of these per room.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    async fn request<T>(
        &self,
        cmd: RoomCommand,
        reply_rx: oneshot::Receiver<T>,
    ) -> Result<T, RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Seats a player in the room.
    pub async fn join(
        &self,
        player: NewPlayer,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(
            RoomCommand::Join {
                player,
                sender,
                reply,
            },
            reply_rx,
        )
        .await?
    }

    /// Unseats a player. Returns how many seats are still taken.
    pub async fn leave(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(RoomCommand::Leave { player_id, reply }, reply_rx)
            .await?
    }

    /// Starts the game on an exactly-full table.
    pub async fn start(&self) -> Result<(), RoomError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(RoomCommand::Start { reply }, reply_rx).await?
    }

    /// Declares the trump suit.
    pub async fn declare_trump(
        &self,
        player_id: PlayerId,
        suit: Suit,
    ) -> Result<(), RoomError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(
            RoomCommand::DeclareTrump {
                player_id,
                suit,
                reply,
            },
            reply_rx,
        )
        .await?
    }

    /// Plays a card.
    pub async fn play_card(&self, player_id: PlayerId, card: Card) -> Result<(), RoomError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(
            RoomCommand::PlayCard {
                player_id,
                card,
                reply,
            },
            reply_rx,
        )
        .await?
    }

    /// Requests the public room snapshot.
    pub async fn get_state(&self) -> Result<RoomStateView, RoomError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(RoomCommand::GetState { reply }, reply_rx)
            .await
    }

    /// Requests `player_id`'s own hand.
    pub async fn get_hand(&self, player_id: PlayerId) -> Result<Vec<Card>, RoomError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request(RoomCommand::GetHand { player_id, reply }, reply_rx)
            .await?
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

/// Fans game notifications out over the per-player channels.
///
/// Broadcasts everything except the trump prompt, which goes only to
/// the chosen player. A send failure means the player's connection task
/// is gone; the departure is handled by their `Leave`, so it is only
/// logged here.
struct FanoutNotifier<'a> {
    room_id: RoomId,
    senders: &'a HashMap<PlayerId, PlayerSender>,
}

impl FanoutNotifier<'_> {
    fn broadcast(&self, msg: ServerMessage) {
        for (player_id, sender) in self.senders {
            if sender.send(msg.clone()).is_err() {
                tracing::debug!(
                    room_id = %self.room_id,
                    %player_id,
                    "dropping notification for closed connection"
                );
            }
        }
    }

    fn send_to(&self, player_id: PlayerId, msg: ServerMessage) {
        match self.senders.get(&player_id) {
            Some(sender) => {
                if sender.send(msg).is_err() {
                    tracing::debug!(
                        room_id = %self.room_id,
                        %player_id,
                        "dropping notification for closed connection"
                    );
                }
            }
            None => tracing::warn!(
                room_id = %self.room_id,
                %player_id,
                "no channel registered for targeted notification"
            ),
        }
    }
}

impl Notifier for FanoutNotifier<'_> {
    fn player_joined(&mut self, player: &Player) {
        self.broadcast(ServerMessage::PlayerJoined {
            player: player.clone(),
        });
    }

    fn player_left(&mut self, player_id: PlayerId) {
        self.broadcast(ServerMessage::PlayerLeft { player_id });
    }

    fn chosen_to_declare(&mut self, player_id: PlayerId) {
        self.send_to(player_id, ServerMessage::ChosenToDeclare { player_id });
    }

    fn trump_declared(&mut self, suit: Suit) {
        self.broadcast(ServerMessage::TrumpDeclared { suit });
    }

    fn turn_started(&mut self, player_id: PlayerId) {
        self.broadcast(ServerMessage::TurnStarted { player_id });
    }

    fn card_played(&mut self, player_id: PlayerId, card: Card) {
        self.broadcast(ServerMessage::CardPlayed { player_id, card });
    }

    fn trick_won(&mut self, winner_id: PlayerId, team_scores: hokm_protocol::TeamScores) {
        self.broadcast(ServerMessage::TrickWon {
            winner_id,
            team_scores,
        });
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    game: HokmGame,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    rng: StdRng,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown or until
    /// the last player leaves.
    async fn run(mut self) {
        let room_id = self.game.room_id();
        tracing::info!(%room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(player_id);
                    let empty = matches!(result, Ok(0));
                    let _ = reply.send(result);
                    if empty {
                        tracing::info!(%room_id, "last player left, room closing");
                        break;
                    }
                }
                RoomCommand::Start { reply } => {
                    let mut notifier = FanoutNotifier {
                        room_id,
                        senders: &self.senders,
                    };
                    let _ = reply.send(self.game.deal_and_start(&mut self.rng, &mut notifier));
                }
                RoomCommand::DeclareTrump {
                    player_id,
                    suit,
                    reply,
                } => {
                    let mut notifier = FanoutNotifier {
                        room_id,
                        senders: &self.senders,
                    };
                    let _ = reply.send(self.game.declare_trump(player_id, suit, &mut notifier));
                }
                RoomCommand::PlayCard {
                    player_id,
                    card,
                    reply,
                } => {
                    let mut notifier = FanoutNotifier {
                        room_id,
                        senders: &self.senders,
                    };
                    let _ = reply.send(self.game.play_card(player_id, card, &mut notifier));
                }
                RoomCommand::GetState { reply } => {
                    let _ = reply.send(self.game.state_view());
                }
                RoomCommand::GetHand { player_id, reply } => {
                    let _ = reply.send(self.game.hand(player_id));
                }
                RoomCommand::Shutdown => {
                    tracing::info!(%room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(%room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player: NewPlayer,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        // Register the channel first so the joiner sees their own join
        // broadcast; roll back if the seat is refused.
        let player_id = player.id;
        self.senders.insert(player_id, sender);
        let mut notifier = FanoutNotifier {
            room_id: self.game.room_id(),
            senders: &self.senders,
        };
        let result = self.game.join(player, &mut self.rng, &mut notifier);
        if result.is_err() {
            self.senders.remove(&player_id);
        }
        result
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<usize, RoomError> {
        // Drop the channel before notifying so the leaver gets no
        // farewell broadcast after their connection is gone.
        let sender = self.senders.remove(&player_id);
        let mut notifier = FanoutNotifier {
            room_id: self.game.room_id(),
            senders: &self.senders,
        };
        match self.game.remove_player(player_id, &mut notifier) {
            Ok(_) => Ok(self.game.player_count()),
            Err(err) => {
                if let Some(sender) = sender {
                    self.senders.insert(player_id, sender);
                }
                Err(err)
            }
        }
    }
}

/// Command channel depth per room. Small on purpose: a room only ever
/// has four players, and backpressure on a flooding client is desirable.
const ROOM_CHANNEL_CAPACITY: usize = 32;

/// Spawns a new room actor task and returns a handle to it.
pub fn spawn_room(room_id: RoomId) -> RoomHandle {
    let (sender, receiver) = mpsc::channel(ROOM_CHANNEL_CAPACITY);
    let actor = RoomActor {
        game: HokmGame::new(room_id),
        senders: HashMap::new(),
        rng: StdRng::from_os_rng(),
        receiver,
    };
    tokio::spawn(actor.run());
    RoomHandle { room_id, sender }
}
