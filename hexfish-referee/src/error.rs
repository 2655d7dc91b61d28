//! Referee errors
//!
//! Only configuration problems and internal state-machine violations surface
//! here. Anything a player does wrong ends in elimination instead.

use hexfish_core::GameError;

#[derive(Debug, thiserror::Error)]
pub enum RefereeError {
    #[error("a match needs between 2 and 4 players, got {0}")]
    PlayerCount(usize),

    #[error(transparent)]
    Game(#[from] GameError),
}
