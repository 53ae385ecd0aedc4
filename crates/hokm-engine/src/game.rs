//! The per-room Hokm state machine.
//!
//! `HokmGame` owns everything about one table: seating, hands, trump,
//! turn order, the current trick, and scores. Mutations happen through
//! the operation methods, which validate first, mutate second, and
//! announce through the injected [`Notifier`] last — a rejected request
//! changes nothing and emits nothing.
//!
//! The game knows nothing about rooms-as-actors or transports; the room
//! actor in [`crate::room`] drives it and fans its notifications out.

use std::collections::HashMap;

use hokm_protocol::{
    Card, Player, PlayerId, RoomId, RoomStateView, Suit, Team, TeamScores, TrickPlay,
};
use rand::Rng;

use crate::deck::{shuffle, standard_deck};
use crate::trick::resolve_trick;
use crate::{Notifier, RoomError};

/// Seats at a table.
pub const SEATS: usize = 4;

/// Cards dealt to each seat (52 / 4).
pub const HAND_SIZE: usize = 13;

/// Identity of a joining player, built by the caller before the join.
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub id: PlayerId,
    pub name: String,
}

/// One table of Hokm.
#[derive(Debug)]
pub struct HokmGame {
    room_id: RoomId,
    /// Seating order = join order. At most [`SEATS`] entries.
    players: Vec<Player>,
    started: bool,
    trump: Option<Suit>,
    /// Who was picked to declare trump. Recorded for observability;
    /// any seated player's declaration is accepted (first one wins).
    chooser: Option<PlayerId>,
    /// Whose card is expected next, as an index into `players`.
    turn_index: usize,
    /// Undealt cards. Empty once the deal has happened.
    deck: Vec<Card>,
    hands: HashMap<PlayerId, Vec<Card>>,
    /// Plays of the trick in progress, in play order. Length 0..=3
    /// between resolutions; resolution fires on the 4th play.
    current_trick: Vec<TrickPlay>,
    team_scores: TeamScores,
}

impl HokmGame {
    /// Creates an empty, unstarted table.
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            players: Vec::with_capacity(SEATS),
            started: false,
            trump: None,
            chooser: None,
            turn_index: 0,
            deck: Vec::new(),
            hands: HashMap::new(),
            current_trick: Vec::new(),
            team_scores: TeamScores::default(),
        }
    }

    // -- Accessors ----------------------------------------------------------

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn trump(&self) -> Option<Suit> {
        self.trump
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    /// The player whose card is expected next. `None` before trump is
    /// declared — no turn has started yet.
    pub fn current_turn(&self) -> Option<PlayerId> {
        self.trump?;
        self.players.get(self.turn_index).map(|p| p.id)
    }

    /// The requesting player's own hand.
    pub fn hand(&self, player_id: PlayerId) -> Result<Vec<Card>, RoomError> {
        if !self.contains(player_id) {
            return Err(RoomError::NotInRoom(player_id, self.room_id));
        }
        Ok(self.hands.get(&player_id).cloned().unwrap_or_default())
    }

    /// Public snapshot of the table. Never includes hands.
    pub fn state_view(&self) -> RoomStateView {
        RoomStateView {
            room_id: self.room_id,
            players: self.players.clone(),
            started: self.started,
            trump: self.trump,
            turn: self.current_turn(),
            trick: self.current_trick.clone(),
            team_scores: self.team_scores,
        }
    }

    // -- Operations ---------------------------------------------------------

    /// Seats a player. Team follows seating parity (even seats team A,
    /// odd seats team B), so partners sit across from each other.
    ///
    /// Seating the 4th player deals and starts the game as part of the
    /// same operation — there is no window where a full room is unstarted.
    pub fn join<N: Notifier>(
        &mut self,
        player: NewPlayer,
        rng: &mut impl Rng,
        notifier: &mut N,
    ) -> Result<(), RoomError> {
        if self.contains(player.id) {
            return Err(RoomError::AlreadyInRoom(player.id, self.room_id));
        }
        if self.players.len() >= SEATS {
            return Err(RoomError::RoomFull(self.room_id));
        }
        if self.started {
            return Err(RoomError::AlreadyStarted(self.room_id));
        }

        let seated = Player {
            id: player.id,
            name: player.name,
            team: Team::for_seat(self.players.len()),
        };
        self.players.push(seated.clone());
        tracing::info!(
            room_id = %self.room_id,
            player_id = %seated.id,
            team = %seated.team,
            players = self.players.len(),
            "player joined"
        );
        notifier.player_joined(&seated);

        if self.players.len() == SEATS {
            self.deal_and_start(rng, notifier)?;
        }
        Ok(())
    }

    /// Shuffles, deals 13 cards to each seat, and picks the trump chooser.
    ///
    /// Guarded by `started` so a second invocation is rejected instead of
    /// re-dealing, and by the seat count so nobody gets a short deal.
    pub fn deal_and_start<N: Notifier>(
        &mut self,
        rng: &mut impl Rng,
        notifier: &mut N,
    ) -> Result<(), RoomError> {
        if self.started {
            return Err(RoomError::AlreadyStarted(self.room_id));
        }
        if self.players.len() != SEATS {
            return Err(RoomError::InvalidState(format!(
                "cannot start with {} of {} players",
                self.players.len(),
                SEATS
            )));
        }

        self.deck = standard_deck();
        shuffle(&mut self.deck, rng);
        for player in &self.players {
            let hand: Vec<Card> = self.deck.drain(..HAND_SIZE).collect();
            self.hands.insert(player.id, hand);
        }
        self.started = true;

        let chooser = self.players[rng.random_range(0..SEATS)].id;
        self.chooser = Some(chooser);
        tracing::info!(
            room_id = %self.room_id,
            chooser = %chooser,
            "game started, awaiting trump"
        );
        notifier.chosen_to_declare(chooser);
        Ok(())
    }

    /// Sets the trump suit for this deal. First declaration wins.
    ///
    /// The designated chooser is not enforced — any seated player's
    /// declaration is accepted, though a mismatch is logged.
    pub fn declare_trump<N: Notifier>(
        &mut self,
        who: PlayerId,
        suit: Suit,
        notifier: &mut N,
    ) -> Result<(), RoomError> {
        if !self.started {
            return Err(RoomError::InvalidState(
                "trump cannot be declared before the deal".into(),
            ));
        }
        if !self.contains(who) {
            return Err(RoomError::NotInRoom(who, self.room_id));
        }
        if self.trump.is_some() {
            return Err(RoomError::AlreadyDeclared(self.room_id));
        }
        if self.chooser.is_some_and(|c| c != who) {
            tracing::warn!(
                room_id = %self.room_id,
                declarer = %who,
                chooser = ?self.chooser,
                "trump declared by someone other than the chooser"
            );
        }

        self.trump = Some(suit);
        tracing::info!(room_id = %self.room_id, %suit, "trump declared");
        notifier.trump_declared(suit);

        // Trick play always opens at seat 0, whoever chose trump.
        notifier.turn_started(self.players[self.turn_index].id);
        Ok(())
    }

    /// Plays a card from `who`'s hand into the current trick.
    ///
    /// Out-of-turn plays (including any play before trump is declared —
    /// no turn has started yet) are rejected with no state change and no
    /// notification to anyone. A card the player does not hold is a hard
    /// error: accepting it would conjure cards into the trick and break
    /// 52-card conservation.
    pub fn play_card<N: Notifier>(
        &mut self,
        who: PlayerId,
        card: Card,
        notifier: &mut N,
    ) -> Result<(), RoomError> {
        if !self.started || self.trump.is_none() {
            return Err(RoomError::NotYourTurn(who));
        }
        let Some(turn_player) = self.players.get(self.turn_index) else {
            tracing::error!(
                room_id = %self.room_id,
                turn_index = self.turn_index,
                players = self.players.len(),
                "turn index points at no seat, isolating room"
            );
            return Err(RoomError::InvalidState("turn index out of range".into()));
        };
        if turn_player.id != who {
            return Err(RoomError::NotYourTurn(who));
        }

        let Some(hand) = self.hands.get_mut(&who) else {
            tracing::error!(
                room_id = %self.room_id,
                player_id = %who,
                "hand missing for seated player, isolating room"
            );
            return Err(RoomError::InvalidState(
                "hand missing for seated player".into(),
            ));
        };
        let Some(pos) = hand.iter().position(|c| *c == card) else {
            return Err(RoomError::CardNotInHand(who, card));
        };

        hand.remove(pos);
        self.current_trick.push(TrickPlay {
            player_id: who,
            card,
        });
        tracing::debug!(room_id = %self.room_id, player_id = %who, %card, "card played");
        notifier.card_played(who, card);

        if self.current_trick.len() == SEATS {
            self.resolve_completed_trick(notifier)
        } else {
            let next = (self.turn_index + 1) % SEATS;
            let Some(next_player) = self.players.get(next) else {
                tracing::error!(
                    room_id = %self.room_id,
                    next,
                    "next seat is empty mid-trick, isolating room"
                );
                return Err(RoomError::InvalidState("next seat is empty".into()));
            };
            self.turn_index = next;
            notifier.turn_started(next_player.id);
            Ok(())
        }
    }

    /// Resolves the four-card trick: winner leads next, their team scores.
    fn resolve_completed_trick<N: Notifier>(
        &mut self,
        notifier: &mut N,
    ) -> Result<(), RoomError> {
        // Trump is set whenever a play is accepted; an empty trick is
        // impossible here. Either failing is a room invariant violation.
        let winner = self
            .trump
            .and_then(|trump| resolve_trick(&self.current_trick, trump));
        let Some(winner) = winner else {
            tracing::error!(room_id = %self.room_id, "completed trick failed to resolve");
            return Err(RoomError::InvalidState("trick failed to resolve".into()));
        };
        let Some(seat) = self.players.iter().position(|p| p.id == winner) else {
            tracing::error!(
                room_id = %self.room_id,
                winner = %winner,
                "trick winner is not seated, isolating room"
            );
            return Err(RoomError::InvalidState("trick winner not seated".into()));
        };

        self.turn_index = seat;
        self.team_scores.award(self.players[seat].team);
        self.current_trick.clear();
        tracing::info!(
            room_id = %self.room_id,
            winner = %winner,
            scores = ?self.team_scores,
            "trick won"
        );
        notifier.trick_won(winner, self.team_scores);
        notifier.turn_started(winner);
        Ok(())
    }

    /// Removes a player from their seat.
    ///
    /// A mid-game departure does not pause, rebalance, or resume the
    /// game — the remaining state stays as-is. Returns `true` when the
    /// table is empty afterwards (the room should then be deleted).
    pub fn remove_player<N: Notifier>(
        &mut self,
        player_id: PlayerId,
        notifier: &mut N,
    ) -> Result<bool, RoomError> {
        let Some(seat) = self.players.iter().position(|p| p.id == player_id) else {
            return Err(RoomError::NotInRoom(player_id, self.room_id));
        };
        self.players.remove(seat);

        // Keep `turn_index` pointing at a seat that still exists. The
        // game itself is left untouched otherwise.
        if !self.players.is_empty() && self.turn_index >= self.players.len() {
            self.turn_index = 0;
        }

        tracing::info!(
            room_id = %self.room_id,
            player_id = %player_id,
            players = self.players.len(),
            "player left"
        );
        notifier.player_left(player_id);
        Ok(self.players.is_empty())
    }
}

// =========================================================================
// Tests
// =========================================================================
