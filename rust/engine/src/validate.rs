//! Existence checks for claimed hands against a round's card pool.
//!
//! All checks are count-based queries over the multiset of cards: a claim
//! never consumes cards, so two claims may be satisfied by the same physical
//! cards. Validation is pure; it never mutates the claim.

use std::collections::HashSet;

use crate::cards::{Card, Rank, Suit};
use crate::hand::PokerHand;

/// Ranks covered by a royal flush, lowest first.
pub const ROYAL_RANKS: [Rank; 5] = [Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace];

/// The five consecutive ranks starting at `low`, or `None` if the run would
/// pass Ace. Straights never wrap: the top span is 10-J-Q-K-A and there is
/// no ace-low wheel.
pub fn straight_span(low: Rank) -> Option<[Rank; 5]> {
    Some([
        low,
        low.offset(1)?,
        low.offset(2)?,
        low.offset(3)?,
        low.offset(4)?,
    ])
}

/// The ranks a claim asserts to exist, for reveal/broadcast display.
/// Only the flush and straight families carry a derivable rank list.
pub fn claimed_ranks(hand: &PokerHand) -> Option<Vec<Rank>> {
    match hand {
        PokerHand::Straight { low } | PokerHand::StraightFlush { low, .. } => {
            straight_span(*low).map(|span| span.to_vec())
        }
        PokerHand::Flush { ranks, .. } => Some(ranks.to_vec()),
        PokerHand::RoyalFlush { .. } => Some(ROYAL_RANKS.to_vec()),
        _ => None,
    }
}

/// Does the claimed hand occur in the supplied multiset of cards?
///
/// ```
/// use bluffpoker_engine::cards::{Card, Rank, Suit};
/// use bluffpoker_engine::hand::PokerHand;
/// use bluffpoker_engine::validate::hand_exists;
///
/// let cards = [
///     Card { suit: Suit::Hearts, rank: Rank::Queen },
///     Card { suit: Suit::Spades, rank: Rank::Queen },
/// ];
/// assert!(hand_exists(&PokerHand::Pair { rank: Rank::Queen }, &cards));
/// assert!(!hand_exists(&PokerHand::ThreeOfAKind { rank: Rank::Queen }, &cards));
/// ```
pub fn hand_exists(hand: &PokerHand, cards: &[Card]) -> bool {
    let counts = rank_counts(cards);
    let count = |r: Rank| counts[r.value() as usize];

    match hand {
        PokerHand::HighCard { rank } => count(*rank) >= 1,
        PokerHand::Pair { rank } => count(*rank) >= 2,
        PokerHand::TwoPairs { high, low } => count(*high) >= 2 && count(*low) >= 2,
        PokerHand::ThreeOfAKind { rank } => count(*rank) >= 3,
        PokerHand::FourOfAKind { rank } => count(*rank) >= 4,
        PokerHand::FullHouse { triple, pair } => count(*triple) >= 3 && count(*pair) >= 2,
        PokerHand::Straight { low } => match straight_span(*low) {
            Some(span) => span.iter().all(|r| count(*r) >= 1),
            None => false,
        },
        PokerHand::Flush { suit, ranks } => {
            let present = ranks_of_suit(cards, *suit);
            ranks.iter().all(|r| present.contains(r))
        }
        PokerHand::StraightFlush { suit, low } => match straight_span(*low) {
            Some(span) => {
                let present = ranks_of_suit(cards, *suit);
                span.iter().all(|r| present.contains(r))
            }
            None => false,
        },
        PokerHand::RoyalFlush { suit } => {
            let present = ranks_of_suit(cards, *suit);
            ROYAL_RANKS.iter().all(|r| present.contains(r))
        }
    }
}

fn rank_counts(cards: &[Card]) -> [u8; 15] {
    let mut counts = [0u8; 15]; // 2..14 used
    for card in cards {
        counts[card.rank.value() as usize] += 1;
    }
    counts
}

fn ranks_of_suit(cards: &[Card], suit: Suit) -> HashSet<Rank> {
    cards
        .iter()
        .filter(|c| c.suit == suit)
        .map(|c| c.rank)
        .collect()
}
