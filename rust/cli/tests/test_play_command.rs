use std::io::Cursor;

fn run_cli(args: &[&str], input: &str) -> (i32, String, String) {
    let mut stdin = Cursor::new(input.as_bytes().to_vec());
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = bluffpoker_cli::run(args.iter().copied(), &mut stdin, &mut out, &mut err);
    (
        code,
        String::from_utf8_lossy(&out).to_string(),
        String::from_utf8_lossy(&err).to_string(),
    )
}

#[test]
fn quitting_at_the_first_prompt_exits_cleanly() {
    let (code, out, _err) = run_cli(&["bluffpoker", "play", "--seed", "7", "--bots", "2"], "quit\n");
    assert_eq!(code, 0);
    assert!(out.contains("game on: seed 7"));
    assert!(
        out.contains("goodbye") || out.contains("game over"),
        "output was:\n{}",
        out
    );
}

#[test]
fn end_of_input_counts_as_leaving() {
    let (code, out, _err) = run_cli(&["bluffpoker", "play", "--seed", "11", "--bots", "1"], "");
    assert_eq!(code, 0);
    assert!(out.contains("goodbye") || out.contains("game over"));
}

#[test]
fn bad_moves_are_reported_without_ending_the_game() {
    let (code, _out, err) = run_cli(
        &["bluffpoker", "play", "--seed", "3", "--bots", "1"],
        "complete gibberish\nquit\n",
    );
    assert_eq!(code, 0);
    assert!(err.contains("cannot parse"), "stderr was: {}", err);
}

#[test]
fn play_rejects_bad_bot_counts() {
    let (code, _out, err) = run_cli(&["bluffpoker", "play", "--bots", "0"], "");
    assert_eq!(code, 2);
    assert!(err.contains("between 1 and 7"));

    let (code, _out, _err) = run_cli(&["bluffpoker", "play", "--bots", "8"], "");
    assert_eq!(code, 2);
}

#[test]
fn the_table_and_own_cards_are_shown_at_the_prompt() {
    let (code, out, _err) = run_cli(&["bluffpoker", "play", "--seed", "5", "--bots", "2"], "quit\n");
    assert_eq!(code, 0);
    // Either the human got a prompt (with table and hand) or the bots
    // finished the game among themselves first
    assert!(
        out.contains("your cards:") || out.contains("game over"),
        "output was:\n{}",
        out
    );
}
