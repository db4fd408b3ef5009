use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};

/// Standard 52-card deck with a seedable RNG for reproducible shuffles.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new() -> Self {
        Self::new_with_seed(rand::random())
    }

    pub fn new_with_seed(seed: u64) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        // Keep initial order until shuffle is called explicitly
        Self {
            cards: full_deck(),
            rng,
        }
    }

    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
    }

    /// Deal one card from the end of the deck, `None` when empty.
    pub fn deal_card(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Deal up to `count` cards; stops early if the deck runs dry.
    pub fn deal_cards(&mut self, count: usize) -> Vec<Card> {
        (0..count).filter_map(|_| self.deal_card()).collect()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn reset(&mut self) {
        self.cards = full_deck();
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}
