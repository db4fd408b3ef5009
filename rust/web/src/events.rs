//! Per-session event fan-out.
//!
//! Every state change in a game is broadcast as a [`GameEvent`] to the
//! session's subscribers over bounded channels; slow subscribers drop
//! events rather than stall the game.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};

use bluffpoker_engine::cards::Card;
use bluffpoker_engine::game::{BluffOutcome, GameStateView};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::session::SessionId;

// Bounded buffer per subscriber; events for a full channel are dropped
const EVENT_CHANNEL_BUFFER: usize = 1000;

pub type EventSender = mpsc::Sender<GameEvent>;
pub type EventReceiver = mpsc::Receiver<GameEvent>;

/// Everything a client can observe about a game, ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    UserJoined {
        session_id: SessionId,
        user_id: String,
        username: String,
    },
    /// Join deferred because a game is running (or the room was full).
    WaitingForGame {
        session_id: SessionId,
        user_id: String,
    },
    UserLeft {
        session_id: SessionId,
        user_id: String,
    },
    GameStarted {
        session_id: SessionId,
    },
    RoundStarted {
        session_id: SessionId,
        round_number: u32,
        starting_player_id: String,
    },
    /// Sent per player; the transport must route it only to its owner.
    CardsDealt {
        session_id: SessionId,
        player_id: String,
        cards: Vec<Card>,
    },
    HandCalled {
        session_id: SessionId,
        player_id: String,
        hand: String,
    },
    BluffCalled {
        session_id: SessionId,
        challenger_id: String,
        outcome: BluffOutcome,
        challenged_hand: String,
    },
    /// The reveal between bluff resolution and the next deal.
    ShowCards {
        session_id: SessionId,
        hands: HashMap<String, Vec<Card>>,
    },
    GameEnded {
        session_id: SessionId,
        winner_id: Option<String>,
    },
    GameStateUpdate {
        session_id: SessionId,
        state: GameStateView,
    },
}

/// Live subscription to one session's events. Unsubscribes itself on drop.
pub struct EventSubscription {
    bus: EventBus,
    session_id: SessionId,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.session_id, self.subscriber_id);
    }
}

impl tokio_stream::Stream for EventSubscription {
    type Item = GameEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<GameEvent>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<HashMap<SessionId, Vec<(usize, EventSender)>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, session_id: SessionId) -> EventSubscription {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        guard.entry(session_id.clone()).or_default().push((id, tx));

        tracing::info!(
            session_id = %session_id,
            subscriber_id = id,
            "client subscribed to game events"
        );

        EventSubscription {
            bus: self.clone(),
            session_id,
            subscriber_id: id,
            receiver: rx,
        }
    }

    pub fn broadcast(&self, session_id: &SessionId, event: GameEvent) {
        tracing::debug!(
            session_id = %session_id,
            event_type = ?event,
            "broadcasting game event"
        );

        let subscribers = {
            let guard = self
                .inner
                .subscribers
                .read()
                .expect("subscriber lock poisoned");
            guard.get(session_id).cloned()
        };

        let Some(list) = subscribers else { return };

        let mut failed = Vec::new();
        for (id, sender) in list {
            // try_send keeps the game loop from blocking on a slow client
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    session_id = %session_id,
                    subscriber_id = id,
                    error = ?e,
                    "failed to send event to subscriber"
                );
                if matches!(e, mpsc::error::TrySendError::Closed(_)) {
                    failed.push(id);
                }
            }
        }

        for id in failed {
            self.unsubscribe(session_id, id);
        }
    }

    pub fn subscriber_count(&self, session_id: &SessionId) -> usize {
        self.inner
            .subscribers
            .read()
            .expect("subscriber lock poisoned")
            .get(session_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn unsubscribe(&self, session_id: &SessionId, subscriber_id: usize) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        if let Some(list) = guard.get_mut(session_id) {
            list.retain(|(id, _)| *id != subscriber_id);
            if list.is_empty() {
                guard.remove(session_id);
            }
        }
    }
}
