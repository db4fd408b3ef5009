//! # Bluffpoker CLI Library
//!
//! Command-line interface for the bluff-poker engine: an interactive local
//! game against bot opponents plus small inspection subcommands.
//!
//! ## Main Entry Point
//!
//! The primary entry point is the [`run`] function, which parses arguments
//! and executes the appropriate subcommand against injected I/O streams,
//! which is also what makes the CLI testable end to end.
//!
//! ```no_run
//! use std::io;
//! let args = vec!["bluffpoker", "parse", "pair", "of", "kings"];
//! let stdin = io::stdin();
//! let code = bluffpoker_cli::run(
//!     args,
//!     &mut stdin.lock(),
//!     &mut io::stdout(),
//!     &mut io::stderr(),
//! );
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `play`: Interactive game against bots (`--bots`, `--seed`, `--name`)
//! - `parse`: Show how a hand specification parses (`--json` for JSON)
//! - `deal`: Deal a sample round face up (`--seed`, `--players`)

use std::io::{BufRead, Write};

pub mod cli;
mod commands;
mod error;
pub mod exit_code;
pub mod formatters;

use clap::Parser;

use cli::{BluffpokerCli, Commands};
pub use error::CliError;

/// Parse `args` and run the selected subcommand.
///
/// Returns the process exit code: `0` on success, `2` on failure. Help and
/// version requests print to `out` and exit `0`.
pub fn run<I, S>(args: I, input: &mut dyn BufRead, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let parsed = BluffpokerCli::try_parse_from(&argv);
    match parsed {
        Err(e) => {
            use clap::error::ErrorKind;
            match e.kind() {
                // Help and version print to stdout and exit 0
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = write!(out, "{}", e.render());
                    exit_code::SUCCESS
                }
                _ => {
                    let _ = write!(err, "{}", e.render());
                    exit_code::FAILURE
                }
            }
        }
        Ok(cli) => {
            let result = match cli.command {
                Commands::Play { bots, seed, name } => {
                    commands::handle_play(bots, seed, &name, input, out, err)
                }
                Commands::Parse { spec, json } => {
                    commands::handle_parse(&spec.join(" "), json, out)
                }
                Commands::Deal { seed, players } => commands::handle_deal(seed, players, out),
            };
            match result {
                Ok(code) => code,
                Err(e) => {
                    let _ = writeln!(err, "Error: {}", e);
                    exit_code::FAILURE
                }
            }
        }
    }
}
