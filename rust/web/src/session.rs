//! Session registry: one independently-owned [`Game`] per session, keyed by
//! a short join code.
//!
//! Every game sits behind its own mutex, so concurrent requests against the
//! same session serialize before they reach the rules engine; the registry
//! itself is an ordinary value shared via `Arc`, not process-wide state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use bluffpoker_ai::BotPlayer;
use bluffpoker_engine::cards::Card;
use bluffpoker_engine::errors::GameError;
use bluffpoker_engine::game::{BluffOutcome, Game, GamePhase, GameStateView};
use bluffpoker_engine::hand::PokerHand;
use bluffpoker_engine::parse::{parse_hand_call, ParseError};
use bluffpoker_engine::player::User;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::events::{EventBus, GameEvent};

pub type SessionId = String;

const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

// Join-code alphabet omits the look-alikes 0/O and 1/I
const SESSION_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),
    #[error("Session expired: {0}")]
    Expired(SessionId),
    #[error("session storage lock poisoned")]
    StoragePoisoned,
    #[error("Invalid hand specification: {0}")]
    Hand(#[from] ParseError),
    #[error(transparent)]
    Rule(#[from] GameError),
}

/// Listing entry for the session index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub phase: GamePhase,
    pub player_count: usize,
    pub waiting_count: usize,
}

/// One hosted game plus its session bookkeeping.
pub struct GameSession {
    id: SessionId,
    game: Mutex<Game>,
    bots: Mutex<HashMap<String, Box<dyn BotPlayer>>>,
    created_at: DateTime<Utc>,
    last_activity: Mutex<Instant>,
}

impl GameSession {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            game: Mutex::new(Game::new()),
            bots: Mutex::new(HashMap::new()),
            created_at: Utc::now(),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Run `f` against the session's game under its mutex.
    pub fn with_game<T>(&self, f: impl FnOnce(&mut Game) -> T) -> Result<T, SessionError> {
        let mut game = self.game.lock().map_err(|_| SessionError::StoragePoisoned)?;
        Ok(f(&mut game))
    }

    pub(crate) fn with_bots<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, Box<dyn BotPlayer>>) -> T,
    ) -> Result<T, SessionError> {
        let mut bots = self.bots.lock().map_err(|_| SessionError::StoragePoisoned)?;
        Ok(f(&mut bots))
    }

    fn touch(&self) {
        if let Ok(mut at) = self.last_activity.lock() {
            *at = Instant::now();
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_activity
            .lock()
            .map(|at| at.elapsed() > ttl)
            .unwrap_or(false)
    }
}

pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<GameSession>>>,
    event_bus: Arc<EventBus>,
    session_ttl: Duration,
}

impl SessionManager {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self::with_ttl(event_bus, DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(event_bus: Arc<EventBus>, ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            event_bus,
            session_ttl: ttl,
        }
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn create_session(&self) -> Result<SessionId, SessionError> {
        let mut guard = self
            .sessions
            .write()
            .map_err(|_| SessionError::StoragePoisoned)?;
        let id = generate_session_id(|candidate| guard.contains_key(candidate));

        tracing::info!(session_id = %id, "creating new game session");
        guard.insert(id.clone(), Arc::new(GameSession::new(id.clone())));
        Ok(id)
    }

    pub fn get_session(&self, id: &SessionId) -> Result<Arc<GameSession>, SessionError> {
        let guard = self
            .sessions
            .read()
            .map_err(|_| SessionError::StoragePoisoned)?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    pub fn session_exists(&self, id: &SessionId) -> bool {
        self.sessions
            .read()
            .map(|guard| guard.contains_key(id))
            .unwrap_or(false)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn list_sessions(&self) -> Result<Vec<SessionInfo>, SessionError> {
        let guard = self
            .sessions
            .read()
            .map_err(|_| SessionError::StoragePoisoned)?;
        let mut infos = Vec::with_capacity(guard.len());
        for session in guard.values() {
            let info = session.with_game(|g| SessionInfo {
                session_id: session.id().clone(),
                created_at: session.created_at(),
                phase: g.phase(),
                player_count: g.player_count(),
                waiting_count: g.waiting_count(),
            })?;
            infos.push(info);
        }
        infos.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(infos)
    }

    pub fn remove_session(&self, id: &SessionId) -> Result<bool, SessionError> {
        let mut guard = self
            .sessions
            .write()
            .map_err(|_| SessionError::StoragePoisoned)?;
        Ok(guard.remove(id).is_some())
    }

    /// Drop sessions idle past the TTL; returns how many were removed.
    pub fn cleanup_expired_sessions(&self) -> Result<usize, SessionError> {
        let expired: Vec<SessionId> = {
            let guard = self
                .sessions
                .read()
                .map_err(|_| SessionError::StoragePoisoned)?;
            guard
                .iter()
                .filter(|(_, s)| s.is_expired(self.session_ttl))
                .map(|(id, _)| id.clone())
                .collect()
        };
        for id in &expired {
            tracing::info!(session_id = %id, "removing expired session");
            self.remove_session(id)?;
        }
        Ok(expired.len())
    }

    /// Fetch a session for use, enforcing the TTL and refreshing activity.
    pub(crate) fn live_session(&self, id: &SessionId) -> Result<Arc<GameSession>, SessionError> {
        let session = self.get_session(id)?;
        if session.is_expired(self.session_ttl) {
            self.remove_session(id)?;
            return Err(SessionError::Expired(id.clone()));
        }
        session.touch();
        Ok(session)
    }

    /// Seat (or queue) a user. `Ok(false)` means the game is running and
    /// the user was queued; a full lobby is rejected outright.
    pub fn join_session(&self, id: &SessionId, user: User) -> Result<bool, SessionError> {
        let session = self.live_session(id)?;
        let user_id = user.id.clone();
        let username = user.username.clone();
        let (was_waiting, joined, state) =
            session.with_game(|g| (g.phase() == GamePhase::Waiting, g.add_player(user), g.game_state()))?;

        if !joined && was_waiting {
            // Not queued, just no seat left
            return Err(SessionError::Rule(GameError::RoomFull));
        }

        if joined {
            self.event_bus.broadcast(
                id,
                GameEvent::UserJoined {
                    session_id: id.clone(),
                    user_id,
                    username,
                },
            );
        } else {
            self.event_bus.broadcast(
                id,
                GameEvent::WaitingForGame {
                    session_id: id.clone(),
                    user_id,
                },
            );
        }
        self.broadcast_state(id, state);
        Ok(joined)
    }

    /// Remove a user from the session; tears the session down once nobody
    /// is left. A removal can end the game, which is broadcast here.
    pub fn leave_session(&self, id: &SessionId, user_id: &str) -> Result<(), SessionError> {
        let session = self.get_session(id)?;
        session.touch();
        let (state, empty) = session.with_game(|g| {
            let was_playing = g.phase() == GamePhase::Playing;
            g.remove_player(user_id);
            let ended = was_playing && g.phase() == GamePhase::Waiting;
            (
                (g.game_state(), ended),
                g.player_count() == 0 && g.waiting_count() == 0,
            )
        })?;
        let (state, ended) = state;
        session.with_bots(|bots| bots.remove(user_id))?;

        self.event_bus.broadcast(
            id,
            GameEvent::UserLeft {
                session_id: id.clone(),
                user_id: user_id.to_string(),
            },
        );
        if ended {
            self.event_bus.broadcast(
                id,
                GameEvent::GameEnded {
                    session_id: id.clone(),
                    winner_id: state.winner_id.clone(),
                },
            );
        }
        self.broadcast_state(id, state);

        if empty {
            tracing::info!(session_id = %id, "session empty, removing");
            self.remove_session(id)?;
        }
        Ok(())
    }

    /// Start the game; broadcasts the first round and each player's deal.
    pub fn start_game(&self, id: &SessionId) -> Result<(), SessionError> {
        let session = self.live_session(id)?;
        let snapshot = session.with_game(|g| -> Result<RoundSnapshot, GameError> {
            if g.phase() != GamePhase::Waiting {
                return Err(GameError::GameInProgress);
            }
            if !g.start_game()? {
                return Err(GameError::NotEnoughPlayers);
            }
            Ok(round_snapshot(g))
        })??;

        self.event_bus.broadcast(
            id,
            GameEvent::GameStarted {
                session_id: id.clone(),
            },
        );
        self.broadcast_round(id, snapshot);
        Ok(())
    }

    /// Parse and apply a textual hand call.
    pub fn call_hand(&self, id: &SessionId, user_id: &str, spec: &str) -> Result<(), SessionError> {
        let hand = parse_hand_call(spec)?;
        self.call_parsed(id, user_id, hand)
    }

    /// Apply an already-parsed hand call.
    pub fn call_parsed(
        &self,
        id: &SessionId,
        user_id: &str,
        hand: PokerHand,
    ) -> Result<(), SessionError> {
        let session = self.live_session(id)?;
        let state = session.with_game(|g| -> Result<GameStateView, GameError> {
            g.make_hand_call(user_id, hand)?;
            Ok(g.game_state())
        })??;

        self.event_bus.broadcast(
            id,
            GameEvent::HandCalled {
                session_id: id.clone(),
                player_id: user_id.to_string(),
                hand: hand.to_string(),
            },
        );
        self.broadcast_state(id, state);
        Ok(())
    }

    /// Challenge the standing call. Reveals every hand, resolves the round
    /// and broadcasts either the next deal or the end of the game.
    pub fn call_bluff(&self, id: &SessionId, user_id: &str) -> Result<BluffOutcome, SessionError> {
        let session = self.live_session(id)?;

        struct Resolution {
            outcome: BluffOutcome,
            challenged_hand: String,
            revealed: HashMap<String, Vec<Card>>,
            state: GameStateView,
            next_round: Option<RoundSnapshot>,
        }

        let resolution = session.with_game(|g| -> Result<Resolution, GameError> {
            let challenged_hand = g
                .current_round()
                .and_then(|r| r.current_call())
                .map(|c| c.hand.to_string())
                .unwrap_or_default();
            // Capture the reveal before resolution redeals or clears hands
            let revealed: HashMap<String, Vec<Card>> = g
                .active_players()
                .iter()
                .map(|p| (p.id().to_string(), p.cards().to_vec()))
                .collect();

            let outcome = g.call_bluff(user_id)?;
            let state = g.game_state();
            let next_round = if state.phase == GamePhase::Playing {
                Some(round_snapshot(g))
            } else {
                None
            };
            Ok(Resolution {
                outcome,
                challenged_hand,
                revealed,
                state,
                next_round,
            })
        })??;

        self.event_bus.broadcast(
            id,
            GameEvent::BluffCalled {
                session_id: id.clone(),
                challenger_id: user_id.to_string(),
                outcome: resolution.outcome.clone(),
                challenged_hand: resolution.challenged_hand,
            },
        );
        self.event_bus.broadcast(
            id,
            GameEvent::ShowCards {
                session_id: id.clone(),
                hands: resolution.revealed,
            },
        );

        match resolution.next_round {
            Some(snapshot) => self.broadcast_round(id, snapshot),
            None => {
                self.event_bus.broadcast(
                    id,
                    GameEvent::GameEnded {
                        session_id: id.clone(),
                        winner_id: resolution.state.winner_id.clone(),
                    },
                );
                self.broadcast_state(id, resolution.state);
            }
        }

        Ok(resolution.outcome)
    }

    pub fn state(&self, id: &SessionId) -> Result<GameStateView, SessionError> {
        let session = self.live_session(id)?;
        session.with_game(|g| g.game_state())
    }

    pub fn player_cards(&self, id: &SessionId, user_id: &str) -> Result<Vec<Card>, SessionError> {
        let session = self.live_session(id)?;
        session.with_game(|g| -> Result<Vec<Card>, GameError> {
            if g.get_player(user_id).is_none() {
                return Err(GameError::UnknownPlayer(user_id.to_string()));
            }
            Ok(g.player_cards(user_id))
        })?
        .map_err(SessionError::from)
    }

    fn broadcast_state(&self, id: &SessionId, state: GameStateView) {
        self.event_bus.broadcast(
            id,
            GameEvent::GameStateUpdate {
                session_id: id.clone(),
                state,
            },
        );
    }

    fn broadcast_round(&self, id: &SessionId, snapshot: RoundSnapshot) {
        self.event_bus.broadcast(
            id,
            GameEvent::RoundStarted {
                session_id: id.clone(),
                round_number: snapshot.round_number,
                starting_player_id: snapshot.starting_player_id,
            },
        );
        for (player_id, cards) in snapshot.hands {
            self.event_bus.broadcast(
                id,
                GameEvent::CardsDealt {
                    session_id: id.clone(),
                    player_id,
                    cards,
                },
            );
        }
        self.broadcast_state(id, snapshot.state);
    }
}

struct RoundSnapshot {
    round_number: u32,
    starting_player_id: String,
    hands: Vec<(String, Vec<Card>)>,
    state: GameStateView,
}

fn round_snapshot(game: &Game) -> RoundSnapshot {
    let (round_number, starting_player_id) = game
        .current_round()
        .map(|r| (r.round_number(), r.starting_player_id().to_string()))
        .unwrap_or((0, String::new()));
    RoundSnapshot {
        round_number,
        starting_player_id,
        hands: game
            .active_players()
            .iter()
            .map(|p| (p.id().to_string(), p.cards().to_vec()))
            .collect(),
        state: game.game_state(),
    }
}

fn generate_session_id(taken: impl Fn(&SessionId) -> bool) -> SessionId {
    let mut rng = rand::rng();
    for len in [5usize, 6] {
        for _ in 0..100 {
            let code: SessionId = (0..len)
                .map(|_| {
                    SESSION_CODE_ALPHABET[rng.random_range(0..SESSION_CODE_ALPHABET.len())] as char
                })
                .collect();
            if !taken(&code) {
                return code;
            }
        }
    }
    // Practically unreachable; uuids cannot collide with the code space
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluffpoker_engine::cards::Rank;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(EventBus::new()))
    }

    fn drain_events(sub: &mut crate::events::EventSubscription) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Ok(event) = sub.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn session_codes_use_the_unambiguous_alphabet() {
        let manager = manager();
        let id = manager.create_session().unwrap();
        assert_eq!(id.len(), 5);
        assert!(id
            .bytes()
            .all(|b| SESSION_CODE_ALPHABET.contains(&b)));
        assert!(manager.session_exists(&id));
    }

    #[test]
    fn sessions_are_independent_games() {
        let manager = manager();
        let a = manager.create_session().unwrap();
        let b = manager.create_session().unwrap();
        assert_ne!(a, b);

        manager
            .join_session(&a, User::new("u1", "alice"))
            .unwrap();
        assert_eq!(manager.state(&a).unwrap().players.len(), 1);
        assert_eq!(manager.state(&b).unwrap().players.len(), 0);
    }

    #[test]
    fn a_full_lobby_rejects_further_joins() {
        let manager = manager();
        let id = manager.create_session().unwrap();
        for i in 0..8 {
            assert!(manager
                .join_session(&id, User::new(format!("u{}", i), format!("p{}", i)))
                .unwrap());
        }
        assert_eq!(
            manager.join_session(&id, User::new("u9", "p9")),
            Err(SessionError::Rule(GameError::RoomFull))
        );
    }

    #[test]
    fn starting_needs_two_players_and_an_open_table() {
        let manager = manager();
        let id = manager.create_session().unwrap();
        manager.join_session(&id, User::new("u1", "alice")).unwrap();
        assert_eq!(
            manager.start_game(&id),
            Err(SessionError::Rule(GameError::NotEnoughPlayers))
        );

        manager.join_session(&id, User::new("u2", "bob")).unwrap();
        manager.start_game(&id).unwrap();
        assert_eq!(
            manager.start_game(&id),
            Err(SessionError::Rule(GameError::GameInProgress))
        );
    }

    #[test]
    fn join_start_call_bluff_flow_broadcasts_events() {
        let manager = manager();
        let id = manager.create_session().unwrap();
        let mut sub = manager.event_bus().subscribe(id.clone());

        assert!(manager.join_session(&id, User::new("u1", "alice")).unwrap());
        assert!(manager.join_session(&id, User::new("u2", "bob")).unwrap());
        manager.start_game(&id).unwrap();

        let events = drain_events(&mut sub);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::GameStarted { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::RoundStarted { round_number: 1, .. })));
        let deals = events
            .iter()
            .filter(|e| matches!(e, GameEvent::CardsDealt { .. }))
            .count();
        assert_eq!(deals, 2);

        let current = manager.state(&id).unwrap().current_player_id.unwrap();
        manager
            .call_hand(&id, &current, "three of a kind kings")
            .unwrap();
        let events = drain_events(&mut sub);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::HandCalled { hand, .. } if hand == "Three of a Kind: Kings"
        )));

        // Two one-card hands can never hold three kings
        let challenger = manager.state(&id).unwrap().current_player_id.unwrap();
        let outcome = manager.call_bluff(&id, &challenger).unwrap();
        assert!(!outcome.hand_existed);
        assert_eq!(outcome.loser_id, current);

        let events = drain_events(&mut sub);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::BluffCalled { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::ShowCards { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::RoundStarted { round_number: 2, .. })));
    }

    #[test]
    fn rule_violations_surface_as_session_errors() {
        let manager = manager();
        let id = manager.create_session().unwrap();
        manager.join_session(&id, User::new("u1", "alice")).unwrap();
        manager.join_session(&id, User::new("u2", "bob")).unwrap();
        manager.start_game(&id).unwrap();

        assert!(matches!(
            manager.call_hand(&id, "u1", "pair of nonsense"),
            Err(SessionError::Hand(_))
        ));

        let current = manager.state(&id).unwrap().current_player_id.unwrap();
        let other = if current == "u1" { "u2" } else { "u1" };
        assert_eq!(
            manager.call_hand(&id, other, "pair of kings"),
            Err(SessionError::Rule(GameError::NotYourTurn))
        );
        assert_eq!(
            manager.call_bluff(&id, &current),
            Err(SessionError::Rule(GameError::NoCallToChallenge))
        );
    }

    #[test]
    fn unknown_sessions_are_reported() {
        let manager = manager();
        let missing = "ZZZZZ".to_string();
        assert_eq!(
            manager.state(&missing),
            Err(SessionError::NotFound(missing.clone()))
        );
    }

    #[test]
    fn expired_sessions_are_cleaned_up() {
        let bus = Arc::new(EventBus::new());
        let manager = SessionManager::with_ttl(Arc::clone(&bus), Duration::ZERO);
        let id = manager.create_session().unwrap();

        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(
            manager.state(&id),
            Err(SessionError::Expired(id.clone()))
        );
        assert!(!manager.session_exists(&id));

        let id2 = manager.create_session().unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(manager.cleanup_expired_sessions().unwrap(), 1);
        assert!(!manager.session_exists(&id2));
    }

    #[test]
    fn leaving_the_last_user_tears_the_session_down() {
        let manager = manager();
        let id = manager.create_session().unwrap();
        manager.join_session(&id, User::new("u1", "alice")).unwrap();
        manager.leave_session(&id, "u1").unwrap();
        assert!(!manager.session_exists(&id));
    }

    #[test]
    fn mid_game_departure_broadcasts_the_end() {
        let manager = manager();
        let id = manager.create_session().unwrap();
        manager.join_session(&id, User::new("u1", "alice")).unwrap();
        manager.join_session(&id, User::new("u2", "bob")).unwrap();
        manager.start_game(&id).unwrap();

        let mut sub = manager.event_bus().subscribe(id.clone());
        manager.leave_session(&id, "u1").unwrap();

        let events = drain_events(&mut sub);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::GameEnded { winner_id: Some(w), .. } if w == "u2"
        )));
        let state = manager.state(&id).unwrap();
        assert_eq!(state.phase, GamePhase::Waiting);
        assert_eq!(state.round_number, 0);
    }

    #[test]
    fn player_cards_requires_a_seated_player() {
        let manager = manager();
        let id = manager.create_session().unwrap();
        manager.join_session(&id, User::new("u1", "alice")).unwrap();
        manager.join_session(&id, User::new("u2", "bob")).unwrap();
        manager.start_game(&id).unwrap();

        assert_eq!(manager.player_cards(&id, "u1").unwrap().len(), 1);
        assert_eq!(
            manager.player_cards(&id, "ghost"),
            Err(SessionError::Rule(GameError::UnknownPlayer(
                "ghost".to_string()
            )))
        );
    }

    #[test]
    fn calls_are_validated_before_the_turn_advances() {
        let manager = manager();
        let id = manager.create_session().unwrap();
        manager.join_session(&id, User::new("u1", "alice")).unwrap();
        manager.join_session(&id, User::new("u2", "bob")).unwrap();
        manager.start_game(&id).unwrap();

        let current = manager.state(&id).unwrap().current_player_id.unwrap();
        manager.call_hand(&id, &current, "pair of 9s").unwrap();

        let next = manager.state(&id).unwrap().current_player_id.unwrap();
        assert_eq!(
            manager.call_parsed(&id, &next, PokerHand::Pair { rank: Rank::Nine }),
            Err(SessionError::Rule(GameError::CallTooLow))
        );
    }
}
