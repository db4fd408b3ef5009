//! Command-line argument definitions.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bluffpoker", version, about = "Bluff-poker card game CLI")]
pub struct BluffpokerCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Play an interactive game against bot opponents
    Play {
        /// Number of bot opponents (1-7)
        #[arg(long, default_value_t = 2)]
        bots: usize,
        /// RNG seed for a reproducible game
        #[arg(long)]
        seed: Option<u64>,
        /// Your display name at the table
        #[arg(long, default_value = "you")]
        name: String,
    },
    /// Parse a hand specification and print the canonical claim
    Parse {
        /// The specification, e.g. "straight flush hearts from 9"
        spec: Vec<String>,
        /// Print the parsed claim as JSON
        #[arg(long)]
        json: bool,
    },
    /// Deal a sample round and show every hand face up
    Deal {
        /// RNG seed for a reproducible deal
        #[arg(long)]
        seed: Option<u64>,
        /// Number of seats to deal to (2-8)
        #[arg(long, default_value_t = 3)]
        players: usize,
    },
}
