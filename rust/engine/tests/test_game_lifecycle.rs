use std::collections::HashMap;

use bluffpoker_engine::cards::{all_ranks, Card, Rank};
use bluffpoker_engine::game::{Game, GamePhase};
use bluffpoker_engine::hand::PokerHand;
use bluffpoker_engine::player::User;

fn user(name: &str) -> User {
    User::new(format!("id-{}", name), name)
}

fn game_with_players(seed: u64, names: &[&str]) -> Game {
    let mut game = Game::with_seed(seed);
    for name in names {
        assert!(game.add_player(user(name)));
    }
    game
}

fn current_player(game: &Game) -> String {
    game.game_state()
        .current_player_id
        .expect("a round should be in progress")
}

/// Rank with the fewest copies in the pool; with fewer than 52 cards in
/// play its count is always below four, so a quad claim on it is false.
fn least_supported_rank(cards: &[Card]) -> Rank {
    let mut counts: HashMap<Rank, usize> = HashMap::new();
    for c in cards {
        *counts.entry(c.rank).or_insert(0) += 1;
    }
    *all_ranks()
        .iter()
        .min_by_key(|r| counts.get(r).copied().unwrap_or(0))
        .unwrap()
}

/// Drive exactly one round so that `victim` loses it: once the turn reaches
/// them they claim an unsupported four of a kind and the next player
/// challenges. Players before them in the order pad with a high-card ladder.
fn force_loss(game: &mut Game, victim: &str) {
    let ladder = all_ranks();
    let mut ladder_iter = ladder.iter();
    loop {
        let current = current_player(game);
        if current == victim {
            let missing = least_supported_rank(game.current_round().unwrap().all_cards());
            game.make_hand_call(&current, PokerHand::FourOfAKind { rank: missing })
                .expect("victim's doomed claim");
            let challenger = current_player(game);
            let outcome = game.call_bluff(&challenger).expect("challenge resolves");
            assert!(!outcome.hand_existed);
            assert_eq!(outcome.loser_id, victim);
            return;
        }
        let rank = ladder_iter.next().expect("ladder exhausted before victim's turn");
        game.make_hand_call(&current, PokerHand::HighCard { rank: *rank })
            .expect("ladder call");
    }
}

#[test]
fn game_needs_two_players_to_start() {
    let mut game = Game::with_seed(1);
    assert!(!game.can_start_game());
    assert!(!game.start_game().unwrap());

    game.add_player(user("alice"));
    assert!(!game.can_start_game());

    game.add_player(user("bob"));
    assert!(game.can_start_game());
    assert!(game.start_game().unwrap());
    assert_eq!(game.phase(), GamePhase::Playing);
    assert_eq!(game.round_number(), 1);
}

#[test]
fn room_caps_at_eight_players() {
    let mut game = Game::with_seed(2);
    for i in 0..8 {
        assert!(game.add_player(User::new(format!("id-{}", i), format!("p{}", i))));
    }
    assert!(!game.add_player(user("ninth")));
    assert_eq!(game.player_count(), 8);
    // Rejected at capacity, not queued: the game has not started
    assert_eq!(game.waiting_count(), 0);
}

#[test]
fn joining_twice_is_idempotent() {
    let mut game = Game::with_seed(3);
    assert!(game.add_player(user("alice")));
    assert!(game.add_player(user("alice")));
    assert_eq!(game.player_count(), 1);
}

#[test]
fn joins_during_play_are_queued_not_seated() {
    let mut game = game_with_players(4, &["alice", "bob"]);
    assert!(game.start_game().unwrap());

    assert!(!game.add_player(user("carol")));
    assert_eq!(game.player_count(), 2);
    assert_eq!(game.waiting_count(), 1);
    assert_eq!(game.waiting_player_ids(), vec!["id-carol".to_string()]);
    assert!(game.spectator_ids().contains(&"id-carol".to_string()));

    // Queueing twice does not duplicate the entry
    assert!(!game.add_player(user("carol")));
    assert_eq!(game.waiting_count(), 1);
}

#[test]
fn losses_accumulate_and_eliminate_at_exactly_five() {
    let mut game = game_with_players(6, &["alice", "bob", "carol"]);
    assert!(game.start_game().unwrap());

    for expected in 1..=4u8 {
        force_loss(&mut game, "id-alice");
        let alice = game.get_player("id-alice").unwrap();
        assert_eq!(alice.losses(), expected);
        assert!(!alice.is_eliminated(), "not eliminated below five losses");
    }

    force_loss(&mut game, "id-alice");
    let alice = game.get_player("id-alice").unwrap();
    assert_eq!(alice.losses(), 5);
    assert!(alice.is_eliminated());

    // Two players remain active; the game goes on without the eliminated seat
    assert_eq!(game.phase(), GamePhase::Playing);
    assert_eq!(game.active_players().len(), 2);
    assert!(!game
        .current_round()
        .unwrap()
        .seating()
        .contains(&"id-alice".to_string()));
    // The seat stays on the roster for display until restart
    assert_eq!(game.game_state().players.len(), 3);
    assert!(game.spectator_ids().contains(&"id-alice".to_string()));
}

#[test]
fn last_player_standing_wins_and_game_reopens() {
    let mut game = game_with_players(7, &["alice", "bob"]);
    assert!(game.start_game().unwrap());

    for _ in 0..5 {
        force_loss(&mut game, "id-alice");
    }

    // Fifth loss eliminated alice, leaving bob alone: game over, table reopens
    assert_eq!(game.phase(), GamePhase::Waiting);
    assert_eq!(game.winner_id(), Some("id-bob"));
    assert_eq!(game.round_number(), 0);
    assert!(game.current_round().is_none());
    for p in game.game_state().players {
        assert_eq!(p.losses, 0);
        assert!(!p.is_eliminated);
        assert_eq!(p.card_count, 0);
    }
}

#[test]
fn removing_to_one_active_player_ends_and_resets_the_game() {
    let mut game = game_with_players(8, &["alice", "bob"]);
    assert!(game.start_game().unwrap());
    assert_eq!(game.phase(), GamePhase::Playing);

    game.remove_player("id-alice");

    assert_eq!(game.phase(), GamePhase::Waiting);
    assert_eq!(game.winner_id(), Some("id-bob"));
    assert_eq!(game.round_number(), 0);
    assert_eq!(game.player_count(), 1);
    let bob = game.get_player("id-bob").unwrap();
    assert_eq!(bob.losses(), 0);
    assert!(!bob.is_eliminated());
}

#[test]
fn removing_the_current_player_passes_the_turn() {
    let mut game = game_with_players(10, &["p1", "p2", "p3"]);
    assert!(game.start_game().unwrap());

    let seating: Vec<String> = game.current_round().unwrap().seating().to_vec();
    let leaver = current_player(&game);
    let leaver_idx = seating.iter().position(|id| *id == leaver).unwrap();
    let expected_next = seating[(leaver_idx + 1) % seating.len()].clone();

    game.remove_player(&leaver);

    // Two players remain, game continues, turn moved on
    assert_eq!(game.phase(), GamePhase::Playing);
    assert_eq!(current_player(&game), expected_next);
    assert!(!game
        .current_round()
        .unwrap()
        .seating()
        .contains(&leaver));
}

#[test]
fn waiting_players_merge_in_join_order_on_restart() {
    let mut game = game_with_players(12, &["alice", "bob"]);
    assert!(game.start_game().unwrap());

    assert!(!game.add_player(user("carol")));
    assert!(!game.add_player(user("dave")));
    assert_eq!(game.waiting_count(), 2);

    game.remove_player("id-alice");

    // Game ended and reopened; queued users hold seats in join order
    assert_eq!(game.phase(), GamePhase::Waiting);
    assert_eq!(game.waiting_count(), 0);
    let roster: Vec<String> = game.game_state().players.into_iter().map(|p| p.user_id).collect();
    assert_eq!(roster, vec!["id-bob", "id-carol", "id-dave"]);
}

#[test]
fn restart_merge_respects_the_room_cap() {
    let names: Vec<String> = (0..8).map(|i| format!("p{}", i)).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut game = game_with_players(14, &name_refs);
    assert!(game.start_game().unwrap());

    assert!(!game.add_player(user("late1")));
    assert!(!game.add_player(user("late2")));

    // Eliminate seven seats; the eighth's survival ends the game
    for victim in &name_refs[..7] {
        let victim_id = format!("id-{}", victim);
        for _ in 0..5 {
            force_loss(&mut game, &victim_id);
        }
    }

    assert_eq!(game.phase(), GamePhase::Waiting);
    assert_eq!(game.winner_id(), Some("id-p7"));
    // Roster kept its eight seats, so the latecomers stay queued
    assert_eq!(game.player_count(), 8);
    assert_eq!(
        game.waiting_player_ids(),
        vec!["id-late1".to_string(), "id-late2".to_string()]
    );
}

#[test]
fn explicit_restart_clears_the_winner() {
    let mut game = game_with_players(15, &["alice", "bob"]);
    assert!(game.start_game().unwrap());
    game.remove_player("id-alice");
    assert_eq!(game.winner_id(), Some("id-bob"));

    game.restart_game();
    assert_eq!(game.winner_id(), None);
    assert_eq!(game.phase(), GamePhase::Waiting);
}

#[test]
fn leaving_while_waiting_frees_the_seat() {
    let mut game = game_with_players(16, &["alice", "bob", "carol"]);
    game.remove_player("id-bob");
    assert_eq!(game.player_count(), 2);
    assert!(game.get_player("id-bob").is_none());
    // Removal below two players outside of play does not invent a winner
    game.remove_player("id-carol");
    assert_eq!(game.player_count(), 1);
    assert_eq!(game.winner_id(), None);
    assert_eq!(game.phase(), GamePhase::Waiting);
}

#[test]
fn state_snapshot_serializes_for_broadcast() {
    let mut game = game_with_players(20, &["alice", "bob"]);
    assert!(game.start_game().unwrap());

    let json = serde_json::to_value(game.game_state()).unwrap();
    assert_eq!(json["phase"], "playing");
    assert_eq!(json["round_number"], 1);
    let players = json["players"].as_array().unwrap();
    assert_eq!(players.len(), 2);
    assert_eq!(players[0]["card_count"], 1);
    assert_eq!(players[0]["losses"], 0);
    assert!(json["current_player_id"].is_string());
    assert!(json["current_call"].is_null());
}

#[test]
fn same_seed_replays_identically() {
    let run = |seed: u64| {
        let mut game = game_with_players(seed, &["alice", "bob"]);
        assert!(game.start_game().unwrap());
        let starter = current_player(&game);
        let cards: Vec<Card> = game.current_round().unwrap().all_cards().to_vec();
        (starter, cards)
    };
    assert_eq!(run(99), run(99));
}
