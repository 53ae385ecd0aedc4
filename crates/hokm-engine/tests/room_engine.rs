//! Integration tests for the room actor and registry, driving full
//! games over the real channels.

use hokm_engine::{NewPlayer, RoomError, RoomRegistry, HAND_SIZE, SEATS};
use hokm_protocol::{Card, PlayerId, RoomId, ServerMessage, Suit};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

fn player(id: u64) -> NewPlayer {
    NewPlayer {
        id: PlayerId(id),
        name: format!("player-{id}"),
    }
}

struct Client {
    id: PlayerId,
    rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Client {
    /// Drains everything delivered so far.
    fn drain(&mut self) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            out.push(msg);
        }
        out
    }
}

/// Creates a room with players 1..=n seated, returning the registry,
/// the room id, and one client per player.
async fn seated_room(n: u64) -> (RoomRegistry, RoomId, Vec<Client>) {
    let mut registry = RoomRegistry::new();
    let mut clients = Vec::new();

    let (tx, rx) = mpsc::unbounded_channel();
    let room_id = registry.create_room(player(1), tx).await.unwrap();
    clients.push(Client {
        id: PlayerId(1),
        rx,
    });

    for id in 2..=n {
        let (tx, rx) = mpsc::unbounded_channel();
        registry.join_room(room_id, player(id), tx).await.unwrap();
        clients.push(Client {
            id: PlayerId(id),
            rx,
        });
    }
    (registry, room_id, clients)
}

/// A full table with trump declared; mailboxes drained.
async fn game_in_play() -> (RoomRegistry, Vec<Client>) {
    let (registry, _, mut clients) = seated_room(4).await;
    registry
        .declare_trump(PlayerId(1), Suit::Spades)
        .await
        .unwrap();
    for c in &mut clients {
        c.drain();
    }
    (registry, clients)
}

/// Plays the first card of whoever's turn it is. Returns the play.
async fn play_next(registry: &RoomRegistry, any_player: PlayerId) -> (PlayerId, Card) {
    let turn = registry
        .room_state(any_player)
        .await
        .unwrap()
        .turn
        .expect("a turn should be in progress");
    let card = registry.hand(turn).await.unwrap()[0];
    registry.play_card(turn, card).await.unwrap();
    (turn, card)
}

// =========================================================================
// Registry lifecycle
// =========================================================================

#[tokio::test]
async fn test_create_room_returns_unique_ids() {
    let mut registry = RoomRegistry::new();
    let r1 = registry
        .create_room(player(1), mpsc::unbounded_channel().0)
        .await
        .unwrap();
    let r2 = registry
        .create_room(player(2), mpsc::unbounded_channel().0)
        .await
        .unwrap();
    assert_ne!(r1, r2);
    assert_eq!(registry.room_count(), 2);
}

#[tokio::test]
async fn test_creator_is_seated_in_their_room() {
    let (registry, room_id, clients) = seated_room(1).await;
    assert_eq!(registry.player_room(clients[0].id), Some(room_id));
    let view = registry.room_state(clients[0].id).await.unwrap();
    assert_eq!(view.players.len(), 1);
    assert!(!view.started);
}

#[tokio::test]
async fn test_join_unknown_room_is_not_found() {
    let mut registry = RoomRegistry::new();
    let err = registry
        .join_room(RoomId(777_777), player(1), mpsc::unbounded_channel().0)
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::RoomNotFound(RoomId(777_777))));
}

#[tokio::test]
async fn test_player_cannot_be_in_two_rooms() {
    let (mut registry, _, _clients) = seated_room(2).await;
    let (tx, _rx) = mpsc::unbounded_channel();
    let other = registry.create_room(player(10), tx).await.unwrap();
    let err = registry
        .join_room(other, player(1), mpsc::unbounded_channel().0)
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::AlreadyInRoom(PlayerId(1), _)));
}

#[tokio::test]
async fn test_fifth_join_is_room_full() {
    let (mut registry, room_id, _clients) = seated_room(4).await;
    let err = registry
        .join_room(room_id, player(5), mpsc::unbounded_channel().0)
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::RoomFull(_)));
}

#[tokio::test]
async fn test_last_leave_deletes_the_room() {
    let (mut registry, room_id, clients) = seated_room(2).await;
    registry.leave(clients[0].id).await.unwrap();
    assert_eq!(registry.room_count(), 1);
    registry.leave(clients[1].id).await.unwrap();
    assert_eq!(registry.room_count(), 0);
    assert_eq!(registry.player_room(clients[1].id), None);

    // The room id is gone for good.
    let err = registry
        .join_room(room_id, player(9), mpsc::unbounded_channel().0)
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::RoomNotFound(_)));
}

#[tokio::test]
async fn test_leave_without_a_room_is_rejected() {
    let mut registry = RoomRegistry::new();
    let err = registry.leave(PlayerId(1)).await.unwrap_err();
    assert!(matches!(err, RoomError::InvalidState(_)));
}

// =========================================================================
// Starting and trump
// =========================================================================

#[tokio::test]
async fn test_fourth_seat_starts_and_prompts_exactly_one_chooser() {
    let (registry, _, mut clients) = seated_room(4).await;
    let view = registry.room_state(clients[0].id).await.unwrap();
    assert!(view.started);
    assert_eq!(view.trump, None);
    assert_eq!(view.turn, None);

    let mut prompted = 0;
    for c in &mut clients {
        for msg in c.drain() {
            if matches!(msg, ServerMessage::ChosenToDeclare { .. }) {
                prompted += 1;
            }
        }
    }
    assert_eq!(prompted, 1, "exactly one player is asked for trump");
}

#[tokio::test]
async fn test_everyone_holds_thirteen_private_cards() {
    let (registry, _, clients) = seated_room(4).await;
    for c in &clients {
        assert_eq!(registry.hand(c.id).await.unwrap().len(), HAND_SIZE);
    }
    // Hands never appear in the public snapshot.
    let view = registry.room_state(clients[0].id).await.unwrap();
    assert!(view.trick.is_empty());
}

#[tokio::test]
async fn test_explicit_start_needs_a_full_table() {
    let (registry, _, clients) = seated_room(3).await;
    let err = registry.start_game(clients[0].id).await.unwrap_err();
    assert!(matches!(err, RoomError::InvalidState(_)));

    let view = registry.room_state(clients[0].id).await.unwrap();
    assert!(!view.started);
}

#[tokio::test]
async fn test_trump_declaration_broadcasts_and_opens_play() {
    let (registry, _, mut clients) = seated_room(4).await;
    for c in &mut clients {
        c.drain();
    }
    registry
        .declare_trump(PlayerId(2), Suit::Hearts)
        .await
        .unwrap();

    for c in &mut clients {
        let msgs = c.drain();
        assert!(msgs.contains(&ServerMessage::TrumpDeclared { suit: Suit::Hearts }));
        assert!(msgs.contains(&ServerMessage::TurnStarted {
            player_id: PlayerId(1)
        }));
    }
}

#[tokio::test]
async fn test_double_trump_declaration_is_rejected() {
    let (registry, _clients) = game_in_play().await;
    let err = registry
        .declare_trump(PlayerId(2), Suit::Clubs)
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::AlreadyDeclared(_)));
    let view = registry.room_state(PlayerId(1)).await.unwrap();
    assert_eq!(view.trump, Some(Suit::Spades));
}

// =========================================================================
// Trick play
// =========================================================================

#[tokio::test]
async fn test_out_of_turn_play_reaches_nobody() {
    let (registry, mut clients) = game_in_play().await;
    let card = registry.hand(PlayerId(3)).await.unwrap()[0];
    let err = registry.play_card(PlayerId(3), card).await.unwrap_err();
    assert!(matches!(err, RoomError::NotYourTurn(PlayerId(3))));

    for c in &mut clients {
        assert!(c.drain().is_empty(), "rejected play must not broadcast");
    }
}

#[tokio::test]
async fn test_play_before_trump_is_rejected() {
    let (registry, _, _clients) = seated_room(4).await;
    let card = registry.hand(PlayerId(1)).await.unwrap()[0];
    let err = registry.play_card(PlayerId(1), card).await.unwrap_err();
    assert!(matches!(err, RoomError::NotYourTurn(_)));
}

#[tokio::test]
async fn test_every_play_is_broadcast_to_all_four() {
    let (registry, mut clients) = game_in_play().await;
    let (who, card) = play_next(&registry, PlayerId(1)).await;
    for c in &mut clients {
        let msgs = c.drain();
        assert!(msgs.contains(&ServerMessage::CardPlayed {
            player_id: who,
            card
        }));
    }
}

#[tokio::test]
async fn test_completed_trick_scores_and_winner_leads() {
    let (registry, mut clients) = game_in_play().await;
    for _ in 0..SEATS {
        play_next(&registry, PlayerId(1)).await;
    }

    let view = registry.room_state(PlayerId(1)).await.unwrap();
    assert!(view.trick.is_empty());
    assert_eq!(view.team_scores.total(), 1);
    let winner = view.turn.expect("winner leads the next trick");

    for c in &mut clients {
        let msgs = c.drain();
        let won = msgs.iter().find_map(|m| match m {
            ServerMessage::TrickWon { winner_id, .. } => Some(*winner_id),
            _ => None,
        });
        assert_eq!(won, Some(winner));
    }
}

#[tokio::test]
async fn test_full_game_plays_thirteen_tricks() {
    let (registry, mut clients) = game_in_play().await;
    for _ in 0..(SEATS * HAND_SIZE) {
        play_next(&registry, PlayerId(1)).await;
    }

    let view = registry.room_state(PlayerId(1)).await.unwrap();
    assert_eq!(view.team_scores.total(), HAND_SIZE as u8);
    assert_eq!(
        view.team_scores.team_a + view.team_scores.team_b,
        HAND_SIZE as u8
    );
    for c in &clients {
        assert!(registry.hand(c.id).await.unwrap().is_empty());
    }

    let trick_wins = clients[0]
        .drain()
        .iter()
        .filter(|m| matches!(m, ServerMessage::TrickWon { .. }))
        .count();
    assert_eq!(trick_wins, HAND_SIZE);
}

#[tokio::test]
async fn test_departure_mid_game_is_broadcast_to_the_rest() {
    let (mut registry, mut clients) = game_in_play().await;
    registry.leave(PlayerId(4)).await.unwrap();

    for c in clients.iter_mut().take(3) {
        let msgs = c.drain();
        assert!(msgs.contains(&ServerMessage::PlayerLeft {
            player_id: PlayerId(4)
        }));
    }
    // The leaver's own channel stays quiet.
    assert!(clients[3].drain().is_empty());

    let view = registry.room_state(PlayerId(1)).await.unwrap();
    assert_eq!(view.players.len(), 3);
    assert!(view.started);
}

#[tokio::test]
async fn test_room_survives_a_dropped_client_channel() {
    let (registry, mut clients) = game_in_play().await;
    // Simulate a dead connection: drop one receiver without leaving.
    let dead = clients.remove(2);
    drop(dead);

    play_next(&registry, PlayerId(1)).await;
    let view = registry.room_state(PlayerId(1)).await.unwrap();
    assert_eq!(view.trick.len(), 1);
}
