//! # bluffpoker-ai: Bot Opponents for the Bluff-Poker Game
//!
//! Provides rule-based bot players that can fill seats in a game. A bot is
//! handed a small view of its turn (its own cards, the standing call and
//! the number of cards in play) and answers with either a stronger claim
//! or a bluff challenge.
//!
//! ## Core Components
//!
//! - [`BotPlayer`] - Trait defining the interface for bot decision-making
//! - [`baseline`] - Plausibility-driven baseline strategy
//! - [`create_bot`] - Factory function for creating bots by name
//!
//! ## Quick Start
//!
//! ```rust
//! use bluffpoker_ai::{create_bot, BotAction, BotContext};
//! use bluffpoker_engine::cards::{Card, Rank, Suit};
//!
//! let mut bot = create_bot("baseline", 42);
//! let cards = [Card { suit: Suit::Hearts, rank: Rank::Nine }];
//! let ctx = BotContext {
//!     own_cards: &cards,
//!     current_call: None,
//!     total_cards: 4,
//! };
//!
//! // Opening turn: the bot must make a claim
//! assert!(matches!(bot.decide(&ctx), BotAction::CallHand(_)));
//! ```

use bluffpoker_engine::cards::Card;
use bluffpoker_engine::hand::PokerHand;

pub mod baseline;

/// What a bot sees when it is asked to act.
#[derive(Debug, Clone, Copy)]
pub struct BotContext<'a> {
    /// The bot's own dealt cards.
    pub own_cards: &'a [Card],
    /// The standing claim to beat, if any.
    pub current_call: Option<&'a PokerHand>,
    /// Total number of cards dealt this round, own cards included.
    pub total_cards: usize,
}

impl BotContext<'_> {
    /// Cards in play the bot cannot see.
    pub fn unseen_cards(&self) -> usize {
        self.total_cards.saturating_sub(self.own_cards.len())
    }
}

/// A bot's move for one turn.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BotAction {
    /// Claim this hand; must be strictly higher than the standing call.
    CallHand(PokerHand),
    /// Challenge the standing call. Only legal when one exists.
    CallBluff,
}

/// Decision interface for bot players.
///
/// Implementations must uphold two legality rules: never return
/// [`BotAction::CallBluff`] without a standing call, and only return claims
/// that strictly beat the standing call.
pub trait BotPlayer: Send + Sync {
    /// Choose an action for the current turn.
    fn decide(&mut self, ctx: &BotContext) -> BotAction;

    /// The bot's identifier/name.
    fn name(&self) -> &str;
}

/// Create a bot by strategy name. Currently only `"baseline"` is supported.
///
/// # Panics
///
/// Panics if an unknown strategy is requested.
pub fn create_bot(kind: &str, seed: u64) -> Box<dyn BotPlayer> {
    match kind {
        "baseline" => Box::new(baseline::BaselineBot::new(seed)),
        _ => panic!("Unknown bot strategy: {}", kind),
    }
}
