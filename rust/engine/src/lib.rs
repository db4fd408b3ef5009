//! # bluffpoker-engine: Bluff-Poker Rules Engine Core
//!
//! The rules engine for a bluffing card game: players are dealt cards
//! privately and take turns either calling an increasingly strong poker
//! hand they claim exists among *all* cards in play, or challenging the
//! previous claim. A failed challenge or a busted claim costs a point;
//! five losses eliminate a player; the last one standing wins.
//!
//! Everything here is synchronous, CPU-bound and deterministic given the
//! game's RNG seed. Transport, persistence and bot opponents live in the
//! sibling crates and talk to this one through [`game::Game`].
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and deck construction
//! - [`deck`] - Deterministic deck shuffling with ChaCha20 RNG
//! - [`hand`] - The ten claimable hand categories and their total order
//! - [`parse`] - Text grammar for hand claims
//! - [`validate`] - Existence checks for claims against a card pool
//! - [`player`] - Seated player state and elimination bookkeeping
//! - [`round`] - One deal-to-resolution cycle and its phase machine
//! - [`game`] - Top-level game state machine and restart handling
//! - [`errors`] - Error types for rejected actions
//!
//! ## Quick Start
//!
//! ```rust
//! use bluffpoker_engine::hand::{compare_hands, PokerHand};
//! use bluffpoker_engine::parse::parse_hand_call;
//! use std::cmp::Ordering;
//!
//! let first = parse_hand_call("pair of queens").unwrap();
//! let second = parse_hand_call("three of a kind kings").unwrap();
//!
//! // Calls must strictly increase
//! assert_eq!(compare_hands(&second, &first), Ordering::Greater);
//! assert_eq!(second.to_string(), "Three of a Kind: Kings");
//! ```
//!
//! ## Deterministic Gameplay
//!
//! All shuffles and the round-1 starter choice draw from a seedable RNG:
//!
//! ```rust
//! use bluffpoker_engine::game::Game;
//! use bluffpoker_engine::player::User;
//!
//! let mut game = Game::with_seed(42);
//! game.add_player(User::new("p1", "alice"));
//! game.add_player(User::new("p2", "bob"));
//! assert!(game.start_game().unwrap());
//! // Same seed, same deal, same starting player
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod game;
pub mod hand;
pub mod parse;
pub mod player;
pub mod round;
pub mod validate;
