//! Trick resolution: a pure function of a completed trick and the trump.

use hokm_protocol::{PlayerId, Suit, TrickPlay};

/// Ranking band for a card given the trump and leading suits.
///
/// Trump beats everything; the leading suit beats off-suit; an off-suit
/// card can never win. Within a band, higher rank wins.
fn priority(suit: Suit, trump: Suit, lead: Suit) -> u8 {
    if suit == trump {
        3
    } else if suit == lead {
        2
    } else {
        1
    }
}

/// Determines the winner of a completed trick.
///
/// The leading suit is the suit of the first play. The winner is the
/// entry with the greatest (priority, rank) key. The lead card is always
/// in band 2 or 3, and cards within one suit have distinct ranks, so the
/// maximum is unique.
///
/// Returns `None` for an empty trick — the engine only calls this with
/// exactly four plays, so `None` signals a broken room invariant rather
/// than a rule outcome.
pub fn resolve_trick(trick: &[TrickPlay], trump: Suit) -> Option<PlayerId> {
    let lead = trick.first()?.card.suit;
    trick
        .iter()
        .max_by_key(|play| (priority(play.card.suit, trump, lead), play.card.rank))
        .map(|play| play.player_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hokm_protocol::Card;

    fn play(id: u64, suit: Suit, rank: u8) -> TrickPlay {
        TrickPlay {
            player_id: PlayerId(id),
            card: Card::new(suit, rank),
        }
    }

    #[test]
    fn test_lone_trump_wins_over_higher_lead_cards() {
        // ♠10, ♠A, ♥2, ♠K with trump ♥ — the lone heart wins.
        let trick = [
            play(1, Suit::Spades, 10),
            play(2, Suit::Spades, 14),
            play(3, Suit::Hearts, 2),
            play(4, Suit::Spades, 13),
        ];
        assert_eq!(resolve_trick(&trick, Suit::Hearts), Some(PlayerId(3)));
    }

    #[test]
    fn test_highest_of_leading_suit_wins_without_trump() {
        // ♣5, ♣9, ♦2, ♣K with trump ♠ — highest club wins.
        let trick = [
            play(1, Suit::Clubs, 5),
            play(2, Suit::Clubs, 9),
            play(3, Suit::Diamonds, 2),
            play(4, Suit::Clubs, 13),
        ];
        assert_eq!(resolve_trick(&trick, Suit::Spades), Some(PlayerId(4)));
    }

    #[test]
    fn test_higher_trump_beats_lower_trump() {
        let trick = [
            play(1, Suit::Diamonds, 14),
            play(2, Suit::Hearts, 4),
            play(3, Suit::Hearts, 11),
            play(4, Suit::Diamonds, 13),
        ];
        assert_eq!(resolve_trick(&trick, Suit::Hearts), Some(PlayerId(3)));
    }

    #[test]
    fn test_lead_suit_trick_won_by_rank() {
        // Everyone follows suit; plain rank comparison decides.
        let trick = [
            play(1, Suit::Diamonds, 7),
            play(2, Suit::Diamonds, 12),
            play(3, Suit::Diamonds, 3),
            play(4, Suit::Diamonds, 8),
        ];
        assert_eq!(resolve_trick(&trick, Suit::Spades), Some(PlayerId(2)));
    }

    #[test]
    fn test_off_suit_cards_lose_regardless_of_rank() {
        // Lead ♣2 is the only club and nothing is trumped: the lowly
        // lead beats two aces.
        let trick = [
            play(1, Suit::Clubs, 2),
            play(2, Suit::Hearts, 14),
            play(3, Suit::Diamonds, 14),
            play(4, Suit::Hearts, 13),
        ];
        assert_eq!(resolve_trick(&trick, Suit::Spades), Some(PlayerId(1)));
    }

    #[test]
    fn test_lead_is_trump() {
        let trick = [
            play(1, Suit::Spades, 9),
            play(2, Suit::Spades, 10),
            play(3, Suit::Hearts, 14),
            play(4, Suit::Spades, 2),
        ];
        assert_eq!(resolve_trick(&trick, Suit::Spades), Some(PlayerId(2)));
    }

    #[test]
    fn test_empty_trick_has_no_winner() {
        assert_eq!(resolve_trick(&[], Suit::Spades), None);
    }
}
