//! Error type shared by the board, state machine and game tree

use crate::board::Coord;
use crate::game::{Move, PlayerColor, Stage};

/// Everything that can go wrong while building or mutating a game
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    // Configuration
    #[error("board must have at least one row and one column")]
    DegenerateBoard,

    #[error("board rows have different lengths")]
    RaggedRows,

    #[error("fish count {0} is outside 1..=5")]
    InvalidFishCount(u8),

    #[error("board needs {needed} one-fish tiles but only {available} tiles are free")]
    NotEnoughTiles { needed: usize, available: usize },

    #[error("a game needs between 2 and 4 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error("color {0} appears more than once")]
    DuplicateColor(PlayerColor),

    // Illegal actions
    #[error("{0} is outside the board")]
    OutOfBounds(Coord),

    #[error("{0} is a hole")]
    Hole(Coord),

    #[error("{0} is already occupied")]
    Occupied(Coord),

    #[error("operation not allowed while the game is {0}")]
    WrongStage(Stage),

    #[error("it is not {actual}'s turn (expected {expected})")]
    NotYourTurn { expected: PlayerColor, actual: PlayerColor },

    #[error("no penguin of {1} stands on {0}")]
    NotYourPenguin(Coord, PlayerColor),

    #[error("{to} cannot be reached from {from}")]
    Unreachable { from: Coord, to: Coord },

    #[error("{0} has already placed every penguin")]
    QuotaReached(PlayerColor),

    #[error("{0} is not a legal move from this position")]
    UnknownMove(Move),

    // State machine
    #[error("no players remain")]
    NoPlayers,

    #[error("winners are only known once the game is over")]
    NotGameOver,

    #[error("cannot undo past the root of the game tree")]
    AtRoot,
}
