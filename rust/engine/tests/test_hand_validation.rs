use bluffpoker_engine::cards::{Card, Rank, Suit};
use bluffpoker_engine::hand::PokerHand;
use bluffpoker_engine::validate::{claimed_ranks, hand_exists, straight_span};

fn card(suit: Suit, rank: Rank) -> Card {
    Card { suit, rank }
}

#[test]
fn high_card_needs_one_occurrence() {
    let cards = [card(Suit::Hearts, Rank::Seven), card(Suit::Clubs, Rank::Two)];
    assert!(hand_exists(&PokerHand::HighCard { rank: Rank::Seven }, &cards));
    assert!(!hand_exists(&PokerHand::HighCard { rank: Rank::Ace }, &cards));
}

#[test]
fn pair_trips_and_quads_count_occurrences() {
    let cards = [
        card(Suit::Hearts, Rank::Nine),
        card(Suit::Clubs, Rank::Nine),
        card(Suit::Spades, Rank::Nine),
        card(Suit::Diamonds, Rank::Four),
    ];
    assert!(hand_exists(&PokerHand::Pair { rank: Rank::Nine }, &cards));
    assert!(hand_exists(&PokerHand::ThreeOfAKind { rank: Rank::Nine }, &cards));
    assert!(!hand_exists(&PokerHand::FourOfAKind { rank: Rank::Nine }, &cards));
    assert!(!hand_exists(&PokerHand::Pair { rank: Rank::Four }, &cards));

    // Removing one nine breaks the trips but not the pair
    let fewer = &cards[1..];
    assert!(hand_exists(&PokerHand::Pair { rank: Rank::Nine }, fewer));
    assert!(!hand_exists(&PokerHand::ThreeOfAKind { rank: Rank::Nine }, fewer));
}

#[test]
fn two_pairs_checks_both_ranks_independently() {
    let cards = [
        card(Suit::Hearts, Rank::Jack),
        card(Suit::Clubs, Rank::Jack),
        card(Suit::Spades, Rank::Five),
        card(Suit::Diamonds, Rank::Five),
    ];
    assert!(hand_exists(&PokerHand::two_pairs(Rank::Jack, Rank::Five), &cards));
    assert!(!hand_exists(&PokerHand::two_pairs(Rank::Jack, Rank::Six), &cards));

    // Count-based: a four-of-a-kind rank satisfies its own pair check even
    // alongside another pair claim on the same cards
    let quads = [
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Clubs, Rank::Eight),
        card(Suit::Spades, Rank::Eight),
        card(Suit::Diamonds, Rank::Eight),
        card(Suit::Hearts, Rank::Three),
        card(Suit::Clubs, Rank::Three),
    ];
    assert!(hand_exists(&PokerHand::two_pairs(Rank::Eight, Rank::Three), &quads));
}

#[test]
fn full_house_needs_three_and_two() {
    let cards = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Spades, Rank::Ten),
        card(Suit::Hearts, Rank::Two),
        card(Suit::Diamonds, Rank::Two),
    ];
    assert!(hand_exists(
        &PokerHand::FullHouse {
            triple: Rank::Ten,
            pair: Rank::Two,
        },
        &cards
    ));
    // Wrong way around: only two tens-as-pair would be fine, but the triple
    // of twos does not exist
    assert!(!hand_exists(
        &PokerHand::FullHouse {
            triple: Rank::Two,
            pair: Rank::Ten,
        },
        &cards
    ));
}

#[test]
fn straight_needs_all_five_consecutive_ranks() {
    let cards = [
        card(Suit::Hearts, Rank::Seven),
        card(Suit::Clubs, Rank::Eight),
        card(Suit::Spades, Rank::Nine),
        card(Suit::Diamonds, Rank::Ten),
        card(Suit::Hearts, Rank::Jack),
    ];
    assert!(hand_exists(&PokerHand::Straight { low: Rank::Seven }, &cards));
    // Gap: no Queen for an 8-high start
    assert!(!hand_exists(&PokerHand::Straight { low: Rank::Eight }, &cards));

    // One required card removed
    let gapped = [
        card(Suit::Hearts, Rank::Seven),
        card(Suit::Clubs, Rank::Eight),
        card(Suit::Diamonds, Rank::Ten),
        card(Suit::Hearts, Rank::Jack),
    ];
    assert!(!hand_exists(&PokerHand::Straight { low: Rank::Seven }, &gapped));
}

#[test]
fn straights_never_wrap_and_have_no_wheel() {
    // A-2-3-4-5 is not a straight in this game
    let wheel = [
        card(Suit::Hearts, Rank::Ace),
        card(Suit::Clubs, Rank::Two),
        card(Suit::Spades, Rank::Three),
        card(Suit::Diamonds, Rank::Four),
        card(Suit::Hearts, Rank::Five),
    ];
    assert!(!hand_exists(&PokerHand::Straight { low: Rank::Ace }, &wheel));

    // J-Q-K-A-(wrap) can never complete
    let top = [
        card(Suit::Hearts, Rank::Jack),
        card(Suit::Clubs, Rank::Queen),
        card(Suit::Spades, Rank::King),
        card(Suit::Diamonds, Rank::Ace),
        card(Suit::Hearts, Rank::Two),
    ];
    assert!(!hand_exists(&PokerHand::Straight { low: Rank::Jack }, &top));

    assert_eq!(straight_span(Rank::Ten).unwrap()[4], Rank::Ace);
    assert!(straight_span(Rank::Jack).is_none());
}

#[test]
fn flush_checks_ranks_within_the_claimed_suit() {
    let cards = [
        card(Suit::Hearts, Rank::Ace),
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Hearts, Rank::Eight),
        card(Suit::Hearts, Rank::Four),
        card(Suit::Hearts, Rank::Two),
        card(Suit::Spades, Rank::King),
    ];
    let claim = PokerHand::Flush {
        suit: Suit::Hearts,
        ranks: [Rank::Ace, Rank::Ten, Rank::Eight, Rank::Four, Rank::Two],
    };
    assert!(hand_exists(&claim, &cards));

    // Same ranks, wrong suit
    let wrong_suit = PokerHand::Flush {
        suit: Suit::Spades,
        ranks: [Rank::Ace, Rank::Ten, Rank::Eight, Rank::Four, Rank::Two],
    };
    assert!(!hand_exists(&wrong_suit, &cards));

    // The Ace of Hearts alone can't stand in for a missing King of Hearts
    let short = PokerHand::Flush {
        suit: Suit::Hearts,
        ranks: [Rank::King, Rank::Ten, Rank::Eight, Rank::Four, Rank::Two],
    };
    assert!(!hand_exists(&short, &cards));
}

#[test]
fn straight_flush_requires_suit_and_run() {
    let cards = [
        card(Suit::Clubs, Rank::Five),
        card(Suit::Clubs, Rank::Six),
        card(Suit::Clubs, Rank::Seven),
        card(Suit::Clubs, Rank::Eight),
        card(Suit::Clubs, Rank::Nine),
    ];
    assert!(hand_exists(
        &PokerHand::StraightFlush {
            suit: Suit::Clubs,
            low: Rank::Five,
        },
        &cards
    ));
    assert!(!hand_exists(
        &PokerHand::StraightFlush {
            suit: Suit::Hearts,
            low: Rank::Five,
        },
        &cards
    ));

    // Break the run with an off-suit card in the middle
    let broken = [
        card(Suit::Clubs, Rank::Five),
        card(Suit::Clubs, Rank::Six),
        card(Suit::Hearts, Rank::Seven),
        card(Suit::Clubs, Rank::Eight),
        card(Suit::Clubs, Rank::Nine),
    ];
    assert!(!hand_exists(
        &PokerHand::StraightFlush {
            suit: Suit::Clubs,
            low: Rank::Five,
        },
        &broken
    ));
}

#[test]
fn royal_flush_requires_broadway_in_suit() {
    let cards = [
        card(Suit::Diamonds, Rank::Ten),
        card(Suit::Diamonds, Rank::Jack),
        card(Suit::Diamonds, Rank::Queen),
        card(Suit::Diamonds, Rank::King),
        card(Suit::Diamonds, Rank::Ace),
    ];
    assert!(hand_exists(&PokerHand::RoyalFlush { suit: Suit::Diamonds }, &cards));
    assert!(!hand_exists(&PokerHand::RoyalFlush { suit: Suit::Clubs }, &cards));

    let missing_king = &cards[..3];
    assert!(!hand_exists(
        &PokerHand::RoyalFlush { suit: Suit::Diamonds },
        missing_king
    ));
}

#[test]
fn claimed_ranks_derives_display_lists_purely() {
    assert_eq!(
        claimed_ranks(&PokerHand::Straight { low: Rank::Seven }),
        Some(vec![
            Rank::Seven,
            Rank::Eight,
            Rank::Nine,
            Rank::Ten,
            Rank::Jack
        ])
    );
    assert_eq!(
        claimed_ranks(&PokerHand::RoyalFlush { suit: Suit::Hearts }),
        Some(vec![Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace])
    );
    assert_eq!(claimed_ranks(&PokerHand::Pair { rank: Rank::Two }), None);
    // Past-Ace starts have no span at all
    assert_eq!(claimed_ranks(&PokerHand::Straight { low: Rank::Queen }), None);
}
