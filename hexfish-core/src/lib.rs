//! HEXFISH Core - Game engine and AI
//!
//! This crate provides the core game logic for HEXFISH:
//! - Board geometry (hex grid with double-height offset coordinates)
//! - Game state, turn order and scoring
//! - Game tree with lazy successor generation and undo
//! - Placement heuristic and minimax move search

pub mod board;
pub mod error;
pub mod game;
pub mod strategy;
pub mod tree;

// Re-exports for convenient access
pub use board::{Board, Coord, Direction, Tile, MAX_FISH};
pub use error::GameError;
pub use game::{GameState, Move, Player, PlayerColor, Stage, MAX_PENGUINS, MAX_PLAYERS, MIN_PLAYERS};
pub use strategy::{first_one_fish_tile, MinimaxStrategy, DEFAULT_DEPTH};
pub use tree::GameTree;
