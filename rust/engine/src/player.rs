use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// Losses at which a player is out of the game.
pub const ELIMINATION_LOSSES: u8 = 5;

/// Identity handed to the engine by the surrounding user directory.
/// The engine treats it as opaque data keyed by `id`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

/// A seated player: identity, the cards dealt this round, and the loss
/// tally that decides both next round's card count and elimination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    user: User,
    cards: Vec<Card>,
    losses: u8,
    is_eliminated: bool,
}

impl Player {
    pub fn new(user: User) -> Self {
        Self {
            user,
            cards: Vec::new(),
            losses: 0,
            is_eliminated: false,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn id(&self) -> &str {
        &self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn losses(&self) -> u8 {
        self.losses
    }

    pub fn is_eliminated(&self) -> bool {
        self.is_eliminated
    }

    /// Number of cards this player is dealt next round.
    pub fn next_round_cards(&self) -> usize {
        self.losses as usize + 1
    }

    pub(crate) fn set_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
    }

    /// Record a lost round; flips the elimination flag at the threshold.
    pub(crate) fn record_loss(&mut self) {
        self.losses += 1;
        if self.losses >= ELIMINATION_LOSSES {
            self.is_eliminated = true;
        }
    }

    /// Back to a fresh seat for a new game.
    pub(crate) fn reset(&mut self) {
        self.cards.clear();
        self.losses = 0;
        self.is_eliminated = false;
    }
}
