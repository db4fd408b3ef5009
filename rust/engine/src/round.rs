use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::deck::Deck;
use crate::hand::PokerHand;

/// Phases of a single round, terminal at `RoundEnd`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Dealing,
    Calling,
    BluffCalled,
    ShowingCards,
    RoundEnd,
}

/// One turn's declaration, appended to the round history and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandCall {
    pub player_id: String,
    pub hand: PokerHand,
    pub timestamp: DateTime<Utc>,
}

/// A single deal-to-resolution cycle. The seating order is a snapshot of
/// the active players taken at round start; `all_cards` is the fixed pool
/// every bluff is checked against.
#[derive(Debug)]
pub struct Round {
    pub(crate) round_number: u32,
    pub(crate) starting_player_id: String,
    pub(crate) current_player_id: String,
    pub(crate) seating: Vec<String>,
    pub(crate) deck: Deck,
    pub(crate) hand_calls: Vec<HandCall>,
    pub(crate) phase: RoundPhase,
    pub(crate) loser_id: Option<String>,
    pub(crate) all_cards: Vec<Card>,
}

impl Round {
    pub(crate) fn new(round_number: u32, starter: String, seating: Vec<String>, deck: Deck) -> Self {
        Self {
            round_number,
            starting_player_id: starter.clone(),
            current_player_id: starter,
            seating,
            deck,
            hand_calls: Vec::new(),
            phase: RoundPhase::Dealing,
            loser_id: None,
            all_cards: Vec::new(),
        }
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn starting_player_id(&self) -> &str {
        &self.starting_player_id
    }

    pub fn current_player_id(&self) -> &str {
        &self.current_player_id
    }

    /// Seating snapshot in join order; removed players drop out mid-round.
    pub fn seating(&self) -> &[String] {
        &self.seating
    }

    pub fn hand_calls(&self) -> &[HandCall] {
        &self.hand_calls
    }

    /// The most recent hand call, if any.
    pub fn current_call(&self) -> Option<&HandCall> {
        self.hand_calls.last()
    }

    pub fn loser_id(&self) -> Option<&str> {
        self.loser_id.as_deref()
    }

    /// Every card dealt this round; fixed once dealing completes.
    pub fn all_cards(&self) -> &[Card] {
        &self.all_cards
    }

    /// Next seat after `player_id` that satisfies `is_active`, wrapping past
    /// the end of the snapshot. Seats of players no longer in the snapshot
    /// resolve from the front, matching how the game has always handled a
    /// mid-round departure.
    pub(crate) fn next_player_after(
        &self,
        player_id: &str,
        is_active: impl Fn(&str) -> bool,
    ) -> Option<String> {
        if self.seating.is_empty() {
            return None;
        }
        let start = self
            .seating
            .iter()
            .position(|id| id == player_id)
            .unwrap_or(0);
        for step in 1..=self.seating.len() {
            let candidate = &self.seating[(start + step) % self.seating.len()];
            if is_active(candidate) {
                return Some(candidate.clone());
            }
        }
        None
    }

    pub(crate) fn remove_from_seating(&mut self, player_id: &str) {
        self.seating.retain(|id| id != player_id);
    }
}
