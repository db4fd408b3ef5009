//! Subcommand handlers.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use bluffpoker_ai::{create_bot, BotAction, BotContext, BotPlayer};
use bluffpoker_engine::game::{Game, GamePhase};
use bluffpoker_engine::parse::parse_hand_call;
use bluffpoker_engine::player::User;

use crate::error::CliError;
use crate::exit_code;
use crate::formatters::{format_cards, format_current_call, format_table};

const HUMAN_ID: &str = "human";

// Generous bound on total turns; a stuck loop is a bug, not a long game
const MAX_TURNS: usize = 100_000;

/// Interactive game against `bots` bot opponents.
pub fn handle_play(
    bots: usize,
    seed: Option<u64>,
    name: &str,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<i32, CliError> {
    if bots == 0 || bots > 7 {
        return Err(CliError::InvalidInput(
            "bots must be between 1 and 7".to_string(),
        ));
    }

    let seed = seed.unwrap_or_else(rand::random);
    let mut game = Game::with_seed(seed);
    game.add_player(User::new(HUMAN_ID, name));

    let mut bot_seats: HashMap<String, Box<dyn BotPlayer>> = HashMap::new();
    for i in 1..=bots {
        let id = format!("bot-{}", i);
        game.add_player(User::new(id.clone(), id.clone()));
        bot_seats.insert(id, create_bot("baseline", seed.wrapping_add(i as u64)));
    }

    if !game.start_game()? {
        return Err(CliError::Internal("game failed to start".to_string()));
    }
    writeln!(out, "game on: seed {}, {} bots. type 'help' for moves.", seed, bots)?;

    for _ in 0..MAX_TURNS {
        let state = game.game_state();

        if state.phase == GamePhase::Waiting {
            let winner = state
                .winner_id
                .as_deref()
                .and_then(|id| state.players.iter().find(|p| p.user_id == id))
                .map(|p| p.username.clone())
                .unwrap_or_else(|| "nobody".to_string());
            writeln!(out, "game over: {} wins!", winner)?;
            return Ok(exit_code::SUCCESS);
        }

        let Some(current) = state.current_player_id.clone() else {
            return Err(CliError::Internal("no current player".to_string()));
        };

        if current == HUMAN_ID {
            writeln!(out, "\nround {}", state.round_number)?;
            writeln!(out, "{}", format_table(&state))?;
            if let Some(call_line) = format_current_call(&state) {
                writeln!(out, "{}", call_line)?;
            }
            writeln!(out, "your cards: {}", format_cards(&game.player_cards(HUMAN_ID)))?;
            write!(out, "your move> ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out, "goodbye")?;
                return Ok(exit_code::SUCCESS);
            }
            let line = line.trim();
            match line {
                "" => continue,
                "quit" | "exit" | "q" => {
                    writeln!(out, "goodbye")?;
                    return Ok(exit_code::SUCCESS);
                }
                "help" => {
                    writeln!(out, "moves:")?;
                    writeln!(out, "  call <hand spec>   e.g. call pair of kings")?;
                    writeln!(out, "  <hand spec>        shorthand for call")?;
                    writeln!(out, "  bluff              challenge the standing call")?;
                    writeln!(out, "  quit               leave the game")?;
                    continue;
                }
                "bluff" => match resolve_bluff(&mut game, HUMAN_ID, out)? {
                    Resolved::Applied => {}
                    Resolved::Rejected(reason) => writeln!(err, "rejected: {}", reason)?,
                },
                other => {
                    let spec = other.strip_prefix("call ").unwrap_or(other);
                    match parse_hand_call(spec) {
                        Ok(hand) => match game.make_hand_call(HUMAN_ID, hand) {
                            Ok(()) => writeln!(out, "you call {}", hand)?,
                            Err(reason) => writeln!(err, "rejected: {}", reason)?,
                        },
                        Err(reason) => writeln!(err, "cannot parse: {}", reason)?,
                    }
                }
            }
        } else {
            let Some(bot) = bot_seats.get_mut(&current) else {
                return Err(CliError::Internal(format!("unknown seat: {}", current)));
            };
            let action = {
                let Some(round) = game.current_round() else {
                    return Err(CliError::Internal("no active round".to_string()));
                };
                let own = game.player_cards(&current);
                let standing = round.current_call().map(|c| c.hand);
                let ctx = BotContext {
                    own_cards: &own,
                    current_call: standing.as_ref(),
                    total_cards: round.all_cards().len(),
                };
                bot.decide(&ctx)
            };
            match action {
                BotAction::CallHand(hand) => {
                    game.make_hand_call(&current, hand)?;
                    writeln!(out, "{} calls {}", current, hand)?;
                }
                BotAction::CallBluff => match resolve_bluff(&mut game, &current, out)? {
                    Resolved::Applied => {}
                    Resolved::Rejected(reason) => {
                        return Err(CliError::Internal(format!(
                            "bot made an illegal challenge: {}",
                            reason
                        )));
                    }
                },
            }
        }
    }

    Err(CliError::Internal("turn limit exceeded".to_string()))
}

enum Resolved {
    Applied,
    Rejected(String),
}

/// Challenge the standing call for `challenger`, printing the reveal and
/// the verdict. Rule rejections are returned, not propagated, so a human
/// mistake stays in the loop.
fn resolve_bluff(game: &mut Game, challenger: &str, out: &mut dyn Write) -> Result<Resolved, CliError> {
    let challenged = game
        .current_round()
        .and_then(|r| r.current_call())
        .map(|c| c.hand.to_string());
    let reveal: Vec<(String, String)> = game
        .active_players()
        .iter()
        .map(|p| (p.username().to_string(), format_cards(p.cards())))
        .collect();

    let challenger_name = game
        .get_player(challenger)
        .map(|p| p.username().to_string())
        .unwrap_or_else(|| challenger.to_string());

    let outcome = match game.call_bluff(challenger) {
        Ok(outcome) => outcome,
        Err(reason) => return Ok(Resolved::Rejected(reason.to_string())),
    };

    writeln!(out, "{} calls bluff!", challenger_name)?;
    for (username, cards) in reveal {
        writeln!(out, "  {} shows {}", username, cards)?;
    }
    if let Some(challenged) = challenged {
        writeln!(
            out,
            "the claim \"{}\" {}",
            challenged,
            if outcome.hand_existed {
                "was there"
            } else {
                "was a bluff"
            }
        )?;
    }
    let loser = game
        .get_player(&outcome.loser_id)
        .map(|p| p.username().to_string())
        .unwrap_or_else(|| outcome.loser_id.clone());
    writeln!(out, "{} loses the round", loser)?;
    Ok(Resolved::Applied)
}

/// Parse a hand spec and print its canonical form.
pub fn handle_parse(spec: &str, json: bool, out: &mut dyn Write) -> Result<i32, CliError> {
    let hand = parse_hand_call(spec)?;
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&hand).map_err(|e| {
            CliError::Internal(format!("cannot serialize claim: {}", e))
        })?)?;
    } else {
        writeln!(out, "{}", hand)?;
    }
    Ok(exit_code::SUCCESS)
}

/// Deal one seeded round to `players` seats and show every hand face up.
pub fn handle_deal(
    seed: Option<u64>,
    players: usize,
    out: &mut dyn Write,
) -> Result<i32, CliError> {
    if !(2..=8).contains(&players) {
        return Err(CliError::InvalidInput(
            "players must be between 2 and 8".to_string(),
        ));
    }

    let seed = seed.unwrap_or_else(rand::random);
    let mut game = Game::with_seed(seed);
    for i in 1..=players {
        game.add_player(User::new(format!("p{}", i), format!("p{}", i)));
    }
    if !game.start_game()? {
        return Err(CliError::Internal("deal failed to start".to_string()));
    }

    writeln!(out, "seed: {}", seed)?;
    for i in 1..=players {
        let id = format!("p{}", i);
        writeln!(out, "{}: {}", id, format_cards(&game.player_cards(&id)))?;
    }
    let pool = game
        .current_round()
        .map(|r| r.all_cards().len())
        .unwrap_or(0);
    writeln!(out, "cards in play: {}", pool)?;
    Ok(exit_code::SUCCESS)
}
