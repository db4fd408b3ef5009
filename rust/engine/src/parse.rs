//! Text grammar for hand claims.
//!
//! Accepted forms, first match wins (the order matters: "straight flush"
//! shares a prefix with "straight" and "flush" and must be tried first):
//!
//! - `Royal Flush <suit>`
//! - `Straight Flush <suit> from <rank>`
//! - `Straight from <rank>`
//! - `Flush of <suit>: <r1>,<r2>,<r3>,<r4>,<r5>` (legacy, punctuation-tolerant)
//! - `Flush <suit> <r1> <r2> <r3> <r4> <r5>`
//! - `Full House: 3 <rank> and 2 <rank>`
//! - `Two Pairs <rank> and <rank>`
//! - `Three of a Kind <rank>` / `3 of a kind <rank>`
//! - `Four of a Kind <rank>` / `4 of a kind <rank>`
//! - `Pair of <rank>` / `Pair <rank>`
//! - `High Card <rank>`
//!
//! Everything is case-insensitive. Rank tokens take digits 2-10 and face
//! names or abbreviations (j/jack, q/queen, k/king, a/ace); suit tokens take
//! the singular noun. Trailing plural "s" is stripped from both.

use std::str::FromStr;

use thiserror::Error;

use crate::cards::{Rank, Suit};
use crate::hand::PokerHand;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown rank: {0}")]
    UnknownRank(String),
    #[error("Unknown suit: {0}")]
    UnknownSuit(String),
    #[error("Flush must specify exactly 5 ranks")]
    FlushRankCount,
    #[error("Cannot parse hand specification: {0}")]
    Unrecognized(String),
}

/// Parse a free-form hand specification into a [`PokerHand`].
///
/// ```
/// use bluffpoker_engine::cards::Rank;
/// use bluffpoker_engine::hand::PokerHand;
/// use bluffpoker_engine::parse::parse_hand_call;
///
/// let hand = parse_hand_call("pair of queens").unwrap();
/// assert_eq!(hand, PokerHand::Pair { rank: Rank::Queen });
/// ```
pub fn parse_hand_call(spec: &str) -> Result<PokerHand, ParseError> {
    let lowered = spec.trim().to_lowercase();
    // ':' '-' ',' are all separators in the legacy forms
    let normalized: String = lowered
        .chars()
        .map(|c| if matches!(c, ':' | ',' | '-') { ' ' } else { c })
        .collect();
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    let unrecognized = || ParseError::Unrecognized(spec.trim().to_string());

    match tokens.as_slice() {
        ["royal", "flush", suit, ..] => Ok(PokerHand::RoyalFlush {
            suit: parse_suit(suit)?,
        }),
        ["straight", "flush", suit, "from", rank, ..] => Ok(PokerHand::StraightFlush {
            suit: parse_suit(suit)?,
            low: parse_rank(rank)?,
        }),
        ["straight", "from", rank, ..] => Ok(PokerHand::Straight {
            low: parse_rank(rank)?,
        }),
        ["flush", "of", suit, rest @ ..] => flush(suit, rest, unrecognized),
        ["flush", suit, rest @ ..] => flush(suit, rest, unrecognized),
        ["full", "house", "3", triple, "and", "2", pair, ..] => Ok(PokerHand::FullHouse {
            triple: parse_rank(triple)?,
            pair: parse_rank(pair)?,
        }),
        ["two", "pairs", a, "and", b, ..] | ["two", "pair", a, "and", b, ..] => {
            Ok(PokerHand::two_pairs(parse_rank(a)?, parse_rank(b)?))
        }
        ["three", "of", "a", "kind", rank, ..] | ["3", "of", "a", "kind", rank, ..] => {
            Ok(PokerHand::ThreeOfAKind {
                rank: parse_rank(rank)?,
            })
        }
        ["four", "of", "a", "kind", rank, ..] | ["4", "of", "a", "kind", rank, ..] => {
            Ok(PokerHand::FourOfAKind {
                rank: parse_rank(rank)?,
            })
        }
        ["pair", "of", rank, ..] | ["pair", rank, ..] => Ok(PokerHand::Pair {
            rank: parse_rank(rank)?,
        }),
        ["high", "card", rank, ..] | ["highcard", rank, ..] => Ok(PokerHand::HighCard {
            rank: parse_rank(rank)?,
        }),
        _ => Err(unrecognized()),
    }
}

fn flush(
    suit: &str,
    rank_tokens: &[&str],
    unrecognized: impl Fn() -> ParseError,
) -> Result<PokerHand, ParseError> {
    let suit = parse_suit(suit)?;
    if rank_tokens.is_empty() {
        return Err(unrecognized());
    }
    if rank_tokens.len() != 5 {
        return Err(ParseError::FlushRankCount);
    }
    let mut ranks = [Rank::Two; 5];
    for (slot, token) in ranks.iter_mut().zip(rank_tokens) {
        *slot = parse_rank(token)?;
    }
    Ok(PokerHand::Flush { suit, ranks })
}

/// Parse a single rank token ("10", "q", "kings", ...).
pub fn parse_rank(token: &str) -> Result<Rank, ParseError> {
    let stripped = token.trim_end_matches('s');
    match stripped {
        "2" => Ok(Rank::Two),
        "3" => Ok(Rank::Three),
        "4" => Ok(Rank::Four),
        "5" => Ok(Rank::Five),
        "6" => Ok(Rank::Six),
        "7" => Ok(Rank::Seven),
        "8" => Ok(Rank::Eight),
        "9" => Ok(Rank::Nine),
        "10" => Ok(Rank::Ten),
        "jack" | "j" => Ok(Rank::Jack),
        "queen" | "q" => Ok(Rank::Queen),
        "king" | "k" => Ok(Rank::King),
        "ace" | "a" => Ok(Rank::Ace),
        _ => Err(ParseError::UnknownRank(stripped.to_string())),
    }
}

/// Parse a single suit token ("heart", "spades", ...).
pub fn parse_suit(token: &str) -> Result<Suit, ParseError> {
    let stripped = token.trim_end_matches('s');
    match stripped {
        "heart" => Ok(Suit::Hearts),
        "diamond" => Ok(Suit::Diamonds),
        "club" => Ok(Suit::Clubs),
        "spade" => Ok(Suit::Spades),
        _ => Err(ParseError::UnknownSuit(stripped.to_string())),
    }
}

impl FromStr for PokerHand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hand_call(s)
    }
}
