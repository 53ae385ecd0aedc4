//! Deck building and shuffling.

use hokm_protocol::{Card, RANK_MAX, RANK_MIN, Suit};
use rand::Rng;
use rand::seq::SliceRandom;

/// Number of cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Builds a standard 52-card deck in suit-then-rank order.
///
/// Exactly one of each (suit, rank) combination — dealing from a
/// shuffled copy of this deck partitions it into four 13-card hands.
pub fn standard_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in RANK_MIN..=RANK_MAX {
            deck.push(Card::new(suit, rank));
        }
    }
    deck
}

/// Shuffles a deck in place with an unbiased Fisher–Yates pass.
///
/// `SliceRandom::shuffle` gives every permutation equal probability,
/// which the dealing fairness depends on. The RNG need not be
/// cryptographically secure, only uniform.
pub fn shuffle(deck: &mut [Card], rng: &mut impl Rng) {
    deck.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_standard_deck_has_52_unique_cards() {
        let deck = standard_deck();
        assert_eq!(deck.len(), DECK_SIZE);
        let unique: HashSet<Card> = deck.iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn test_standard_deck_has_13_of_each_suit() {
        let deck = standard_deck();
        for suit in Suit::ALL {
            let count = deck.iter().filter(|c| c.suit == suit).count();
            assert_eq!(count, 13, "suit {suit}");
        }
        assert!(deck.iter().all(|c| c.is_standard()));
    }

    #[test]
    fn test_shuffle_preserves_the_card_set() {
        let mut deck = standard_deck();
        shuffle(&mut deck, &mut rand::rng());
        let unique: HashSet<Card> = deck.iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    /// Chi-square goodness-of-fit over which card lands in a fixed
    /// position. With 10,400 shuffles each of the 52 cards should land
    /// in position 0 about 200 times; the statistic has 51 degrees of
    /// freedom, so values around 51 are expected and anything beyond
    /// 120 would mean the shuffle is far from uniform.
    #[test]
    fn test_shuffle_uniformity_chi_square() {
        const TRIALS: usize = 10_400;
        let mut rng = rand::rng();
        let reference = standard_deck();

        for position in [0usize, 25, 51] {
            let mut counts = vec![0u32; DECK_SIZE];
            for _ in 0..TRIALS {
                let mut deck = reference.clone();
                shuffle(&mut deck, &mut rng);
                let idx = reference
                    .iter()
                    .position(|c| *c == deck[position])
                    .unwrap();
                counts[idx] += 1;
            }

            let expected = TRIALS as f64 / DECK_SIZE as f64;
            let chi_square: f64 = counts
                .iter()
                .map(|&observed| {
                    let d = observed as f64 - expected;
                    d * d / expected
                })
                .sum();

            assert!(
                chi_square < 120.0,
                "position {position}: chi-square {chi_square:.1} too large"
            );
        }
    }
}
