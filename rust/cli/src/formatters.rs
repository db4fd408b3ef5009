//! Terminal rendering for cards, claims and the table state.

use bluffpoker_engine::cards::Card;
use bluffpoker_engine::game::GameStateView;

/// Render a hand of cards as a single line, e.g. `A♠ 10♥ 3♦`.
pub fn format_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the roster with card counts and losses, one player per line.
pub fn format_table(state: &GameStateView) -> String {
    let mut lines = Vec::with_capacity(state.players.len());
    for player in &state.players {
        let marker = if Some(&player.user_id) == state.current_player_id.as_ref() {
            "->"
        } else {
            "  "
        };
        let status = if player.is_eliminated {
            " (eliminated)"
        } else {
            ""
        };
        lines.push(format!(
            "{} {:<12} cards:{} losses:{}{}",
            marker, player.username, player.card_count, player.losses, status
        ));
    }
    lines.join("\n")
}

/// Render the standing claim line, if any call has been made this round.
pub fn format_current_call(state: &GameStateView) -> Option<String> {
    state
        .current_call
        .as_ref()
        .map(|call| format!("standing call: {} (by {})", call.hand, call.player_id))
}
