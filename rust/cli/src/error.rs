//! Error types for the CLI application.

use std::fmt;

use bluffpoker_engine::errors::GameError;
use bluffpoker_engine::parse::ParseError;

/// Custom error type for CLI operations, allowing error propagation with
/// the `?` operator across command handlers.
#[derive(Debug)]
pub enum CliError {
    /// I/O error (stdout/stderr writes, reading player input)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// The rules engine rejected an action the CLI believed was legal
    Rule(GameError),

    /// Internal inconsistency in the game loop
    Internal(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Rule(e) => write!(f, "Rule error: {}", e),
            CliError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Rule(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<GameError> for CliError {
    fn from(error: GameError) -> Self {
        CliError::Rule(error)
    }
}

impl From<ParseError> for CliError {
    fn from(error: ParseError) -> Self {
        CliError::InvalidInput(error.to_string())
    }
}
