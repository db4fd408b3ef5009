//! Baseline bot strategy.
//!
//! The bot weighs the standing claim against what it can see: the ranks it
//! holds cover part of the claim, and every unseen card is one more chance
//! for the rest to exist. A claim whose uncovered remainder is large next to
//! the unseen pool gets challenged; anything else gets outbid as cheaply as
//! possible, preferring claims the bot's own cards already support.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use bluffpoker_engine::cards::{all_ranks, Card, Rank};
use bluffpoker_engine::hand::{compare_hands, is_valid_next_call, PokerHand};
use bluffpoker_engine::validate::{straight_span, ROYAL_RANKS};

use crate::{BotAction, BotContext, BotPlayer};

/// Plausibility-driven baseline bot.
///
/// # Example
///
/// ```rust
/// use bluffpoker_ai::baseline::BaselineBot;
/// use bluffpoker_ai::{BotAction, BotContext, BotPlayer};
/// use bluffpoker_engine::cards::{Card, Rank, Suit};
/// use bluffpoker_engine::hand::PokerHand;
///
/// let mut bot = BaselineBot::new(7);
/// let cards = [Card { suit: Suit::Clubs, rank: Rank::Two }];
/// let royal = PokerHand::RoyalFlush { suit: Suit::Spades };
/// let ctx = BotContext {
///     own_cards: &cards,
///     current_call: Some(&royal),
///     total_cards: 3,
/// };
/// // A royal flush in a three-card pool is not credible
/// assert_eq!(bot.decide(&ctx), BotAction::CallBluff);
/// ```
#[derive(Debug)]
pub struct BaselineBot {
    rng: ChaCha20Rng,
}

impl BaselineBot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    fn opening_claim(&mut self, own: &[Card]) -> PokerHand {
        let counts = rank_counts(own);
        // Lead with a pair we actually hold when we have one
        if let Some(rank) = all_ranks()
            .iter()
            .rev()
            .find(|r| counts[r.value() as usize] >= 2)
        {
            return PokerHand::Pair { rank: *rank };
        }
        let best = own.iter().map(|c| c.rank).max().unwrap_or(Rank::Two);
        PokerHand::HighCard { rank: best }
    }

    fn should_challenge(&mut self, call: &PokerHand, ctx: &BotContext) -> bool {
        let missing = deficit(call, ctx.own_cards);
        if missing == 0 {
            // We are holding the claim ourselves; challenging would be suicide
            return false;
        }
        let unseen = ctx.unseen_cards() as u32;
        // Roughly one unseen card in four covers a specific outstanding need
        4 * missing > unseen + self.rng.random_range(0..2)
    }

    /// The weakest claim the bot's own cards fully support that still beats
    /// the standing call.
    fn supported_raise(&self, current: &PokerHand, own: &[Card]) -> Option<PokerHand> {
        let counts = rank_counts(own);
        let count = |r: Rank| counts[r.value() as usize];

        let mut candidates: Vec<PokerHand> = Vec::new();
        for r in all_ranks() {
            if count(r) >= 1 {
                candidates.push(PokerHand::HighCard { rank: r });
            }
            if count(r) >= 2 {
                candidates.push(PokerHand::Pair { rank: r });
            }
            if count(r) >= 3 {
                candidates.push(PokerHand::ThreeOfAKind { rank: r });
            }
            if count(r) >= 4 {
                candidates.push(PokerHand::FourOfAKind { rank: r });
            }
        }
        let pair_ranks: Vec<Rank> = all_ranks()
            .into_iter()
            .filter(|r| count(*r) >= 2)
            .collect();
        for (i, &a) in pair_ranks.iter().enumerate() {
            for &b in &pair_ranks[i + 1..] {
                candidates.push(PokerHand::two_pairs(a, b));
            }
        }

        candidates.retain(|c| is_valid_next_call(current, c));
        candidates.into_iter().min_by(|a, b| compare_hands(a, b))
    }
}

impl BotPlayer for BaselineBot {
    fn decide(&mut self, ctx: &BotContext) -> BotAction {
        match ctx.current_call {
            None => BotAction::CallHand(self.opening_claim(ctx.own_cards)),
            Some(call) => {
                if self.should_challenge(call, ctx) {
                    return BotAction::CallBluff;
                }
                if let Some(raise) = self.supported_raise(call, ctx.own_cards) {
                    return BotAction::CallHand(raise);
                }
                match next_minimal_call(call) {
                    Some(raise) => BotAction::CallHand(raise),
                    // Top of the ladder: challenging is the only move left
                    None => BotAction::CallBluff,
                }
            }
        }
    }

    fn name(&self) -> &str {
        "BaselineBot"
    }
}

/// Number of claimed cards the bot cannot cover from its own hand.
fn deficit(claim: &PokerHand, own: &[Card]) -> u32 {
    let counts = rank_counts(own);
    let need = |r: Rank, n: u8| n.saturating_sub(counts[r.value() as usize]) as u32;
    let suited_missing = |suit, ranks: &[Rank]| {
        ranks
            .iter()
            .filter(|r| !own.iter().any(|c| c.suit == suit && c.rank == **r))
            .count() as u32
    };

    match *claim {
        PokerHand::HighCard { rank } => need(rank, 1),
        PokerHand::Pair { rank } => need(rank, 2),
        PokerHand::TwoPairs { high, low } => need(high, 2) + need(low, 2),
        PokerHand::ThreeOfAKind { rank } => need(rank, 3),
        PokerHand::FourOfAKind { rank } => need(rank, 4),
        PokerHand::FullHouse { triple, pair } => need(triple, 3) + need(pair, 2),
        PokerHand::Straight { low } => match straight_span(low) {
            Some(span) => span.iter().map(|r| need(*r, 1)).sum(),
            None => 5,
        },
        PokerHand::Flush { suit, ranks } => suited_missing(suit, &ranks),
        PokerHand::StraightFlush { suit, low } => match straight_span(low) {
            Some(span) => suited_missing(suit, &span),
            None => 5,
        },
        PokerHand::RoyalFlush { suit } => suited_missing(suit, &ROYAL_RANKS),
    }
}

/// Smallest claim strictly above `current`, walking the ladder the way a
/// cautious player would. Returns `None` above a royal flush.
fn next_minimal_call(current: &PokerHand) -> Option<PokerHand> {
    use PokerHand::*;
    match *current {
        HighCard { rank } => match rank.offset(1) {
            Some(r) => Some(HighCard { rank: r }),
            None => Some(Pair { rank: Rank::Two }),
        },
        Pair { rank } => match rank.offset(1) {
            Some(r) => Some(Pair { rank: r }),
            None => Some(PokerHand::two_pairs(Rank::Three, Rank::Two)),
        },
        TwoPairs { high, low } => {
            if let Some(h) = high.offset(1) {
                Some(TwoPairs { high: h, low })
            } else if let (Some(l), Some(h)) = (low.offset(1), low.offset(2)) {
                Some(TwoPairs { high: h, low: l })
            } else {
                Some(ThreeOfAKind { rank: Rank::Two })
            }
        }
        ThreeOfAKind { rank } => match rank.offset(1) {
            Some(r) => Some(ThreeOfAKind { rank: r }),
            None => Some(Straight { low: Rank::Two }),
        },
        Straight { low } => {
            if low < Rank::Ten {
                low.offset(1).map(|r| Straight { low: r })
            } else {
                // Bots never invent a five-rank flush; step over the family
                Some(FullHouse {
                    triple: Rank::Two,
                    pair: Rank::Three,
                })
            }
        }
        Flush { .. } => Some(FullHouse {
            triple: Rank::Two,
            pair: Rank::Three,
        }),
        FullHouse { triple, pair } => {
            let mut next_pair = pair.offset(1);
            if next_pair == Some(triple) {
                next_pair = triple.offset(1);
            }
            match next_pair {
                Some(p) => Some(FullHouse { triple, pair: p }),
                None => match triple.offset(1) {
                    Some(t) => {
                        let p = if t == Rank::Two { Rank::Three } else { Rank::Two };
                        Some(FullHouse { triple: t, pair: p })
                    }
                    None => Some(FourOfAKind { rank: Rank::Two }),
                },
            }
        }
        FourOfAKind { rank } => match rank.offset(1) {
            Some(r) => Some(FourOfAKind { rank: r }),
            None => Some(StraightFlush {
                suit: bluffpoker_engine::cards::Suit::Clubs,
                low: Rank::Two,
            }),
        },
        StraightFlush { suit, low } => {
            if low < Rank::Ten {
                low.offset(1).map(|r| StraightFlush { suit, low: r })
            } else {
                Some(RoyalFlush { suit })
            }
        }
        RoyalFlush { .. } => None,
    }
}

fn rank_counts(cards: &[Card]) -> [u8; 15] {
    let mut counts = [0u8; 15];
    for card in cards {
        counts[card.rank.value() as usize] += 1;
    }
    counts
}
