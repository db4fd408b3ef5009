use thiserror::Error;

/// Rule violations and capacity rejections raised by the game state machine.
/// Every variant is recoverable: the offending action is declined and no
/// state is mutated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Game is full")]
    RoomFull,
    #[error("Game already in progress")]
    GameInProgress,
    #[error("Need at least 2 players to start")]
    NotEnoughPlayers,
    #[error("No active round")]
    NoActiveRound,
    #[error("Not in calling phase")]
    NotInCallingPhase,
    #[error("Not your turn")]
    NotYourTurn,
    #[error("Hand call must be higher than previous call")]
    CallTooLow,
    #[error("No hand call to bluff")]
    NoCallToChallenge,
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),
    // A legal game can never drain the deck (8 players x 5 cards max), so
    // hitting this means the gating above it is broken.
    #[error("Deck exhausted while dealing")]
    DeckExhausted,
}
