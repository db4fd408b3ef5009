//! Bot seats: lets a session be filled out with computer players and
//! drives them whenever the turn lands on one.

use bluffpoker_ai::{create_bot, BotAction, BotContext};
use bluffpoker_engine::game::GamePhase;
use bluffpoker_engine::player::User;
use uuid::Uuid;

use crate::session::{SessionError, SessionId, SessionManager};

// Upper bound on consecutive bot moves per drive; a full table of bots
// cannot loop forever on a single request
const MAX_BOT_MOVES: usize = 64;

impl SessionManager {
    /// Seat a bot in the session. Returns the bot's identity, or `None`
    /// when the seat request was queued or rejected by the game.
    pub fn add_bot(&self, id: &SessionId, strategy: &str) -> Result<Option<User>, SessionError> {
        let session = self.live_session(id)?;
        let number = session.with_bots(|bots| bots.len())? + 1;
        let user = User::new(
            format!("bot-{}", Uuid::new_v4().simple()),
            format!("{}-bot-{}", strategy, number),
        );

        let joined = self.join_session(id, user.clone())?;
        if !joined {
            return Ok(None);
        }

        session.with_bots(|bots| {
            bots.insert(user.id.clone(), create_bot(strategy, rand::random()))
        })?;
        tracing::info!(session_id = %id, bot_id = %user.id, strategy, "bot seated");
        Ok(Some(user))
    }

    /// Let bots play until the turn reaches a human (or the game stops).
    /// Call after any state-changing action.
    pub fn drive_bots(&self, id: &SessionId) -> Result<(), SessionError> {
        for _ in 0..MAX_BOT_MOVES {
            let session = match self.get_session(id) {
                Ok(session) => session,
                // The last bluff may have emptied and removed the session
                Err(SessionError::NotFound(_)) => return Ok(()),
                Err(err) => return Err(err),
            };

            let decision = session.with_game(|g| {
                if g.phase() != GamePhase::Playing {
                    return None;
                }
                let round = g.current_round()?;
                let current = round.current_player_id().to_string();
                let own = g.player_cards(&current);
                let standing = round.current_call().map(|c| c.hand);
                let total_cards = round.all_cards().len();

                session
                    .with_bots(|bots| {
                        let bot = bots.get_mut(&current)?;
                        let ctx = BotContext {
                            own_cards: &own,
                            current_call: standing.as_ref(),
                            total_cards,
                        };
                        Some(bot.decide(&ctx))
                    })
                    .ok()
                    .flatten()
                    .map(|action| (current, action))
            })?;

            let Some((bot_id, action)) = decision else {
                return Ok(());
            };

            let result = match action {
                BotAction::CallHand(hand) => self.call_parsed(id, &bot_id, hand),
                BotAction::CallBluff => self.call_bluff(id, &bot_id).map(|_| ()),
            };

            if let Err(err) = result {
                // A bot move should never be illegal; log and stop rather
                // than spin on the same rejection
                tracing::warn!(
                    session_id = %id,
                    bot_id = %bot_id,
                    error = %err,
                    "bot action rejected"
                );
                return Ok(());
            }
        }

        tracing::warn!(session_id = %id, "bot drive hit the move cap");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::events::EventBus;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(EventBus::new()))
    }

    #[test]
    fn bots_take_seats_like_players() {
        let manager = manager();
        let id = manager.create_session().unwrap();

        let bot = manager.add_bot(&id, "baseline").unwrap();
        assert!(bot.is_some());
        assert_eq!(manager.state(&id).unwrap().players.len(), 1);
    }

    #[test]
    fn a_table_of_bots_plays_rounds_on_its_own() {
        let manager = manager();
        let id = manager.create_session().unwrap();
        manager.add_bot(&id, "baseline").unwrap();
        manager.add_bot(&id, "baseline").unwrap();

        manager.start_game(&id).unwrap();
        manager.drive_bots(&id).unwrap();

        // Bots keep acting until somebody loses at least one round
        let state = manager.state(&id).unwrap();
        let total_losses: u32 = state.players.iter().map(|p| p.losses as u32).sum();
        assert!(
            total_losses >= 1 || state.phase == GamePhase::Waiting,
            "bot table made no progress"
        );
    }

    #[test]
    fn bots_queued_mid_game_are_not_registered_as_seated() {
        let manager = manager();
        let id = manager.create_session().unwrap();
        manager
            .join_session(&id, User::new("u1", "alice"))
            .unwrap();
        manager.join_session(&id, User::new("u2", "bob")).unwrap();
        manager.start_game(&id).unwrap();

        let bot = manager.add_bot(&id, "baseline").unwrap();
        assert!(bot.is_none());
        assert_eq!(manager.state(&id).unwrap().waiting_players_count, 1);
    }
}
