//! The `Notifier` capability: how the engine announces game events.
//!
//! The game state machine never touches a socket. It calls one of these
//! methods after each mutation and the caller decides what delivery
//! means — channel fanout in the room actor, a plain `Vec` in tests.
//! Delivery is fire-and-forget: implementations must not fail, and a
//! lost recipient never unwinds the state change that already happened.

use hokm_protocol::{Card, Player, PlayerId, Suit, TeamScores};

/// Receives game notifications, one method per event.
///
/// All events are scoped to the members of one room. `chosen_to_declare`
/// is the exception to the broadcast rule: it must reach only the chosen
/// player, so the other hands' owners learn nothing about who picks trump
/// until it is declared.
pub trait Notifier {
    /// A player took a seat.
    fn player_joined(&mut self, player: &Player);

    /// A player left their seat.
    fn player_left(&mut self, player_id: PlayerId);

    /// This player (and only this player) must declare trump.
    fn chosen_to_declare(&mut self, player_id: PlayerId);

    /// Trump is set for the deal.
    fn trump_declared(&mut self, suit: Suit);

    /// It is this player's turn to play.
    fn turn_started(&mut self, player_id: PlayerId);

    /// A card went from a hand into the current trick.
    fn card_played(&mut self, player_id: PlayerId, card: Card);

    /// A trick resolved; scores are the running totals.
    fn trick_won(&mut self, winner_id: PlayerId, team_scores: TeamScores);
}
