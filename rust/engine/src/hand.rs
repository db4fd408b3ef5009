use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::{Rank, Suit};

/// The ten claimable hand categories, ordered weakest to strongest.
/// The discriminant is the category's rank in the calling ladder.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum HandCategory {
    HighCard = 1,
    Pair = 2,
    TwoPairs = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

/// A claimed poker hand. Each variant carries exactly the parameters that
/// identify it, so parsing, validation, comparison and display all match
/// exhaustively.
///
/// # Examples
///
/// ```
/// use bluffpoker_engine::cards::Rank;
/// use bluffpoker_engine::hand::{HandCategory, PokerHand};
///
/// let claim = PokerHand::Pair { rank: Rank::Queen };
/// assert_eq!(claim.category(), HandCategory::Pair);
/// assert_eq!(claim.to_string(), "Pair of Queens");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum PokerHand {
    HighCard { rank: Rank },
    Pair { rank: Rank },
    /// `high >= low`; use [`PokerHand::two_pairs`] to keep that normalized.
    TwoPairs { high: Rank, low: Rank },
    ThreeOfAKind { rank: Rank },
    /// `low` is the lowest rank of the five-card run.
    Straight { low: Rank },
    /// The five claimed ranks, all of `suit`.
    Flush { suit: Suit, ranks: [Rank; 5] },
    FullHouse { triple: Rank, pair: Rank },
    FourOfAKind { rank: Rank },
    StraightFlush { suit: Suit, low: Rank },
    RoyalFlush { suit: Suit },
}

impl PokerHand {
    /// Two-pairs constructor that normalizes the pair order so the higher
    /// rank always lands in `high`, regardless of how the claim was spoken.
    pub fn two_pairs(a: Rank, b: Rank) -> PokerHand {
        if a >= b {
            PokerHand::TwoPairs { high: a, low: b }
        } else {
            PokerHand::TwoPairs { high: b, low: a }
        }
    }

    pub fn category(&self) -> HandCategory {
        match self {
            PokerHand::HighCard { .. } => HandCategory::HighCard,
            PokerHand::Pair { .. } => HandCategory::Pair,
            PokerHand::TwoPairs { .. } => HandCategory::TwoPairs,
            PokerHand::ThreeOfAKind { .. } => HandCategory::ThreeOfAKind,
            PokerHand::Straight { .. } => HandCategory::Straight,
            PokerHand::Flush { .. } => HandCategory::Flush,
            PokerHand::FullHouse { .. } => HandCategory::FullHouse,
            PokerHand::FourOfAKind { .. } => HandCategory::FourOfAKind,
            PokerHand::StraightFlush { .. } => HandCategory::StraightFlush,
            PokerHand::RoyalFlush { .. } => HandCategory::RoyalFlush,
        }
    }
}

impl fmt::Display for PokerHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PokerHand::HighCard { rank } => write!(f, "High Card {}", rank.word()),
            PokerHand::Pair { rank } => write!(f, "Pair of {}s", rank.word()),
            PokerHand::TwoPairs { high, low } => {
                write!(f, "Two Pairs: {}s and {}s", high.word(), low.word())
            }
            PokerHand::ThreeOfAKind { rank } => {
                write!(f, "Three of a Kind: {}s", rank.word())
            }
            PokerHand::Straight { low } => write!(f, "Straight from {}", low.word()),
            PokerHand::Flush { suit, ranks } => {
                let mut sorted = *ranks;
                sorted.sort_unstable_by(|a, b| b.cmp(a));
                let words: Vec<&str> = sorted.iter().map(|r| r.word()).collect();
                write!(f, "Flush of {}: {}", suit.name(), words.join(","))
            }
            PokerHand::FullHouse { triple, pair } => {
                write!(
                    f,
                    "Full House: Three {}s, Two {}s",
                    triple.word(),
                    pair.word()
                )
            }
            PokerHand::FourOfAKind { rank } => {
                write!(f, "Four of a Kind: {}s", rank.word())
            }
            PokerHand::StraightFlush { suit, low } => {
                write!(f, "Straight Flush {} from {}", suit.name(), low.word())
            }
            PokerHand::RoyalFlush { suit } => write!(f, "Royal Flush {}", suit.name()),
        }
    }
}

/// Total order over claims used to enforce strictly-increasing calls.
///
/// Category decides first; within a category the tie-break is the claim's
/// identifying rank(s). Two royal flushes always compare equal, so neither
/// can be called over the other.
pub fn compare_hands(a: &PokerHand, b: &PokerHand) -> Ordering {
    match a.category().cmp(&b.category()) {
        Ordering::Equal => tie_break(a, b),
        ord => ord,
    }
}

/// `next` beats `current` strictly; equal or lower calls are rejected.
pub fn is_valid_next_call(current: &PokerHand, next: &PokerHand) -> bool {
    compare_hands(next, current) == Ordering::Greater
}

fn tie_break(a: &PokerHand, b: &PokerHand) -> Ordering {
    use PokerHand::*;
    match (a, b) {
        (HighCard { rank: x }, HighCard { rank: y })
        | (Pair { rank: x }, Pair { rank: y })
        | (ThreeOfAKind { rank: x }, ThreeOfAKind { rank: y })
        | (FourOfAKind { rank: x }, FourOfAKind { rank: y }) => x.cmp(y),
        (Straight { low: x }, Straight { low: y })
        | (StraightFlush { low: x, .. }, StraightFlush { low: y, .. }) => x.cmp(y),
        // (min, max) lexicographic, as the game has always ranked them
        (TwoPairs { high: h1, low: l1 }, TwoPairs { high: h2, low: l2 }) => {
            (l1, h1).cmp(&(l2, h2))
        }
        (FullHouse { triple: t1, pair: p1 }, FullHouse { triple: t2, pair: p2 }) => {
            t1.cmp(t2).then(p1.cmp(p2))
        }
        // Only the highest claimed rank matters between flushes
        (Flush { ranks: r1, .. }, Flush { ranks: r2, .. }) => {
            r1.iter().max().cmp(&r2.iter().max())
        }
        (RoyalFlush { .. }, RoyalFlush { .. }) => Ordering::Equal,
        // Different categories never reach the tie-break
        _ => Ordering::Equal,
    }
}
