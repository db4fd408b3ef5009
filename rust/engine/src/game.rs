use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::hand::{is_valid_next_call, PokerHand};
use crate::player::{Player, User};
use crate::round::{HandCall, Round, RoundPhase};
use crate::validate::hand_exists;

/// Hard cap on seated players.
pub const MAX_PLAYERS: usize = 8;

/// Top-level game phases. `Ended` is a momentary pivot: the game commits
/// its bookkeeping and reopens as `Waiting` within the same call, so
/// callers only ever observe `Waiting` or `Playing` at rest.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Waiting,
    Playing,
    Ended,
}

/// Result of a resolved bluff challenge.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BluffOutcome {
    /// Whether the challenged claim was actually present in the card pool.
    pub hand_existed: bool,
    /// The round's loser: the challenger if the claim held, otherwise the
    /// claimant.
    pub loser_id: String,
}

/// Per-player entry in a [`GameStateView`].
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub user_id: String,
    pub username: String,
    pub card_count: usize,
    pub losses: u8,
    pub is_eliminated: bool,
}

/// The latest call in a [`GameStateView`], rendered for broadcast.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CallView {
    pub player_id: String,
    pub hand: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Broadcast-ready snapshot of the whole game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateView {
    pub game_id: String,
    pub phase: GamePhase,
    pub players: Vec<PlayerView>,
    pub round_number: u32,
    pub current_player_id: Option<String>,
    pub current_call: Option<CallView>,
    pub winner_id: Option<String>,
    pub waiting_players_count: usize,
}

/// The game state machine: roster, round sequencing, elimination, win
/// detection and the waiting-list merge on restart.
///
/// All operations are synchronous and atomic from the caller's point of
/// view: an action is either accepted with a fully updated state or
/// rejected with a [`GameError`] and no mutation. The only randomness is
/// deck shuffling and the round-1 starter choice, both drawn from the
/// game's own seedable RNG.
#[derive(Debug)]
pub struct Game {
    game_id: String,
    phase: GamePhase,
    players: HashMap<String, Player>,
    player_order: Vec<String>,
    current_round: Option<Round>,
    round_number: u32,
    winner_id: Option<String>,
    waiting_players: Vec<User>,
    rng: ChaCha20Rng,
}

impl Game {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Deterministic construction for tests and replay.
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let game_id = fresh_game_id(&mut rng);
        Self {
            game_id,
            phase: GamePhase::Waiting,
            players: HashMap::new(),
            player_order: Vec::new(),
            current_round: None,
            round_number: 0,
            winner_id: None,
            waiting_players: Vec::new(),
            rng,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn winner_id(&self) -> Option<&str> {
        self.winner_id.as_deref()
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.current_round.as_ref()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting_players.len()
    }

    pub fn get_player(&self, user_id: &str) -> Option<&Player> {
        self.players.get(user_id)
    }

    /// Seat a player, or queue them while a game is in progress.
    /// Returns `false` when the user was queued or the room is full.
    pub fn add_player(&mut self, user: User) -> bool {
        if self.phase != GamePhase::Waiting {
            // Game in progress: defer to the waiting list
            if !self.waiting_players.iter().any(|u| u.id == user.id) {
                self.waiting_players.push(user);
            }
            return false;
        }

        if self.players.len() >= MAX_PLAYERS {
            return false;
        }

        self.insert_player(user);
        true
    }

    /// Drop a player from the roster (and the current round, advancing the
    /// turn when it was theirs). Ends the game when at most one active
    /// player would remain.
    pub fn remove_player(&mut self, user_id: &str) {
        if self.players.contains_key(user_id) {
            if let Some(round) = self.current_round.as_mut() {
                // Hand the turn on before the seat disappears, so it lands on
                // the next player in the original snapshot ordering
                if round.current_player_id == user_id {
                    let players = &self.players;
                    if let Some(next) = round.next_player_after(user_id, |id| {
                        id != user_id && players.get(id).is_some_and(|p| !p.is_eliminated())
                    }) {
                        round.current_player_id = next;
                    }
                }
                round.remove_from_seating(user_id);
            }
            self.players.remove(user_id);
            self.player_order.retain(|id| id != user_id);
        }

        self.waiting_players.retain(|u| u.id != user_id);

        if self.phase == GamePhase::Playing && self.active_player_ids().len() <= 1 {
            self.end_game();
        }
    }

    /// Non-eliminated roster members in join order; empty outside of play.
    pub fn active_players(&self) -> Vec<&Player> {
        if self.phase != GamePhase::Playing {
            return Vec::new();
        }
        self.player_order
            .iter()
            .filter_map(|id| self.players.get(id))
            .filter(|p| !p.is_eliminated())
            .collect()
    }

    /// Users watching but not playing: queued joiners plus eliminated seats.
    pub fn spectator_ids(&self) -> Vec<String> {
        if self.phase != GamePhase::Playing {
            return Vec::new();
        }
        let mut result: Vec<String> = self
            .waiting_players
            .iter()
            .filter(|u| !self.players.contains_key(&u.id))
            .map(|u| u.id.clone())
            .collect();
        result.extend(
            self.player_order
                .iter()
                .filter(|id| {
                    self.players
                        .get(id.as_str())
                        .is_some_and(|p| p.is_eliminated())
                })
                .cloned(),
        );
        result
    }

    pub fn waiting_player_ids(&self) -> Vec<String> {
        self.waiting_players.iter().map(|u| u.id.clone()).collect()
    }

    pub fn player_cards(&self, user_id: &str) -> Vec<Card> {
        self.players
            .get(user_id)
            .map(|p| p.cards().to_vec())
            .unwrap_or_default()
    }

    pub fn can_start_game(&self) -> bool {
        self.phase == GamePhase::Waiting && self.players.len() >= 2
    }

    /// Begin play: resets every seat and deals round 1.
    /// `Ok(false)` when the gate (`can_start_game`) is closed.
    pub fn start_game(&mut self) -> Result<bool, GameError> {
        if !self.can_start_game() {
            return Ok(false);
        }

        self.phase = GamePhase::Playing;
        self.round_number = 0;
        self.winner_id = None;
        for player in self.players.values_mut() {
            player.reset();
        }

        self.start_new_round()?;
        Ok(true)
    }

    /// The current player claims `hand`; it must strictly beat the latest
    /// call. On success the turn advances to the next active seat.
    pub fn make_hand_call(&mut self, user_id: &str, hand: PokerHand) -> Result<(), GameError> {
        let round = self
            .current_round
            .as_mut()
            .ok_or(GameError::NoActiveRound)?;
        if round.phase != RoundPhase::Calling {
            return Err(GameError::NotInCallingPhase);
        }
        if round.current_player_id != user_id {
            return Err(GameError::NotYourTurn);
        }

        if let Some(current) = round.current_call() {
            if !is_valid_next_call(&current.hand, &hand) {
                return Err(GameError::CallTooLow);
            }
        }

        round.hand_calls.push(HandCall {
            player_id: user_id.to_string(),
            hand,
            timestamp: chrono::Utc::now(),
        });

        let players = &self.players;
        if let Some(next) = round.next_player_after(user_id, |id| {
            players.get(id).is_some_and(|p| !p.is_eliminated())
        }) {
            round.current_player_id = next;
        }

        Ok(())
    }

    /// The current player challenges the latest call. The claim is checked
    /// against the round's full card pool; the loser is recorded, the round
    /// ends, and either the next round starts or the game ends.
    pub fn call_bluff(&mut self, user_id: &str) -> Result<BluffOutcome, GameError> {
        let round = self
            .current_round
            .as_mut()
            .ok_or(GameError::NoActiveRound)?;
        if round.phase != RoundPhase::Calling {
            return Err(GameError::NotInCallingPhase);
        }
        if round.current_player_id != user_id {
            return Err(GameError::NotYourTurn);
        }

        let current = round.current_call().ok_or(GameError::NoCallToChallenge)?;
        let hand_existed = hand_exists(&current.hand, &round.all_cards);
        let claimant = current.player_id.clone();

        round.phase = RoundPhase::BluffCalled;
        let loser_id = if hand_existed {
            // Claim held up: the challenger pays
            user_id.to_string()
        } else {
            claimant
        };
        round.loser_id = Some(loser_id.clone());

        self.end_round(&loser_id)?;

        Ok(BluffOutcome {
            hand_existed,
            loser_id,
        })
    }

    /// Wipe scores and reopen the table, merging queued users into the
    /// roster in join order up to the cap.
    pub fn restart_game(&mut self) {
        self.winner_id = None;
        self.reset_for_next_game();
    }

    /// Broadcast-ready snapshot of the roster, round and latest call.
    pub fn game_state(&self) -> GameStateView {
        let players = self
            .player_order
            .iter()
            .filter_map(|id| self.players.get(id))
            .map(|p| PlayerView {
                user_id: p.id().to_string(),
                username: p.username().to_string(),
                card_count: p.card_count(),
                losses: p.losses(),
                is_eliminated: p.is_eliminated(),
            })
            .collect();

        let current_call = self
            .current_round
            .as_ref()
            .and_then(|r| r.current_call())
            .map(|c| CallView {
                player_id: c.player_id.clone(),
                hand: c.hand.to_string(),
                timestamp: c.timestamp,
            });

        GameStateView {
            game_id: self.game_id.clone(),
            phase: self.phase,
            players,
            round_number: self.round_number,
            current_player_id: self
                .current_round
                .as_ref()
                .map(|r| r.current_player_id.clone()),
            current_call,
            winner_id: self.winner_id.clone(),
            waiting_players_count: self.waiting_players.len(),
        }
    }

    fn insert_player(&mut self, user: User) {
        if !self.players.contains_key(&user.id) {
            self.player_order.push(user.id.clone());
            self.players.insert(user.id.clone(), Player::new(user));
        }
    }

    fn active_player_ids(&self) -> Vec<String> {
        self.active_players()
            .iter()
            .map(|p| p.id().to_string())
            .collect()
    }

    fn start_new_round(&mut self) -> Result<(), GameError> {
        self.round_number += 1;
        let active = self.active_player_ids();

        if active.len() <= 1 {
            self.end_game();
            return Ok(());
        }

        let starter = if self.round_number == 1 {
            // First round: anyone may start
            active[self.rng.random_range(0..active.len())].clone()
        } else if let Some(prev) = self
            .current_round
            .as_ref()
            .map(|r| r.starting_player_id.clone())
        {
            // Rotate from the previous round's starter, not the loser
            let prev_index = active.iter().position(|id| *id == prev).unwrap_or(0);
            active[(prev_index + 1) % active.len()].clone()
        } else {
            active[0].clone()
        };

        let mut deck = Deck::new_with_seed(self.rng.random());
        deck.shuffle();
        let mut round = Round::new(self.round_number, starter, active.clone(), deck);

        // Deal losses+1 cards to each seat; the union becomes the round's
        // fixed validation pool.
        let mut all_cards = Vec::new();
        for id in &active {
            let player = match self.players.get_mut(id) {
                Some(p) => p,
                None => continue,
            };
            let wanted = player.next_round_cards();
            let cards = round.deck.deal_cards(wanted);
            if cards.len() != wanted {
                return Err(GameError::DeckExhausted);
            }
            all_cards.extend_from_slice(&cards);
            player.set_cards(cards);
        }
        round.all_cards = all_cards;
        round.phase = RoundPhase::Calling;

        self.current_round = Some(round);
        Ok(())
    }

    fn end_round(&mut self, loser_id: &str) -> Result<(), GameError> {
        if let Some(round) = self.current_round.as_mut() {
            round.phase = RoundPhase::RoundEnd;
        }

        if let Some(loser) = self.players.get_mut(loser_id) {
            loser.record_loss();
        }

        if self.active_player_ids().len() <= 1 {
            self.end_game();
            Ok(())
        } else {
            self.start_new_round()
        }
    }

    fn end_game(&mut self) {
        // Winner must be read before the phase flips
        let winner = self.active_player_ids().into_iter().next();
        self.phase = GamePhase::Ended;
        self.reset_for_next_game();
        self.winner_id = winner;
    }

    fn reset_for_next_game(&mut self) {
        self.game_id = fresh_game_id(&mut self.rng);
        self.phase = GamePhase::Waiting;
        self.current_round = None;
        self.round_number = 0;

        for player in self.players.values_mut() {
            player.reset();
        }

        // Queued users take seats in their original join order; overflow
        // stays queued for the game after this one.
        let waiting = std::mem::take(&mut self.waiting_players);
        for user in waiting {
            if self.players.len() < MAX_PLAYERS {
                self.insert_player(user);
            } else {
                self.waiting_players.push(user);
            }
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

fn fresh_game_id(rng: &mut ChaCha20Rng) -> String {
    format!("{:016x}", rng.random::<u64>())
}
