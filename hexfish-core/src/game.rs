//! Game state, turn order and rule enforcement

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::board::{Board, Coord};
use crate::error::GameError;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Penguins per player are `MAX_PENGUINS - player count`
pub const MAX_PENGUINS: usize = 6;

/// Minimum players in a game
pub const MIN_PLAYERS: usize = 2;

/// Maximum players in a game (one per color)
pub const MAX_PLAYERS: usize = 4;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player color
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    Red,
    White,
    Brown,
    Black,
}

impl PlayerColor {
    /// Palette in assignment order
    pub const ALL: [PlayerColor; MAX_PLAYERS] = [
        PlayerColor::Red,
        PlayerColor::White,
        PlayerColor::Brown,
        PlayerColor::Black,
    ];
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerColor::Red => "red",
            PlayerColor::White => "white",
            PlayerColor::Brown => "brown",
            PlayerColor::Black => "black",
        };
        f.write_str(name)
    }
}

/// Phase of the game; only ever moves forward
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    NotStarted,
    PlacingPenguins,
    InPlay,
    GameOver,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::NotStarted => "not started",
            Stage::PlacingPenguins => "placing penguins",
            Stage::InPlay => "in play",
            Stage::GameOver => "over",
        };
        f.write_str(name)
    }
}

/// A penguin relocation. Carries no legality guarantee by itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Coord,
    pub to: Coord,
}

impl Move {
    pub const fn new(from: Coord, to: Coord) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// A participant as the rules see it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    color: PlayerColor,
    score: u32,
    /// Placement order; a move replaces the coordinate in place
    penguins: Vec<Coord>,
}

impl Player {
    fn new(color: PlayerColor) -> Self {
        Self {
            color,
            score: 0,
            penguins: Vec::new(),
        }
    }

    pub fn color(&self) -> PlayerColor {
        self.color
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn penguins(&self) -> &[Coord] {
        &self.penguins
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state (clone for an independent copy)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StateRecord")]
pub struct GameState {
    stage: Stage,
    board: Board,
    /// Turn order
    players: Vec<Player>,
    current: usize,
    penguin_quota: usize,
    /// Mirror of every player's penguin list, keyed by tile
    #[serde(skip)]
    penguins: FxHashMap<Coord, PlayerColor>,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty game waiting for `init_game`
    pub fn new() -> Self {
        Self::default()
    }

    /// Game ready for penguin placement
    pub fn with_players(board: Board, colors: &[PlayerColor]) -> Result<Self, GameError> {
        let mut state = Self::new();
        state.init_game(board, colors)?;
        Ok(state)
    }

    /// Install the board and players; `colors` is the turn order
    pub fn init_game(&mut self, board: Board, colors: &[PlayerColor]) -> Result<(), GameError> {
        self.require_stage(Stage::NotStarted)?;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&colors.len()) {
            return Err(GameError::InvalidPlayerCount(colors.len()));
        }
        let mut seen = FxHashSet::default();
        for &color in colors {
            if !seen.insert(color) {
                return Err(GameError::DuplicateColor(color));
            }
        }

        self.board = board;
        self.players = colors.iter().copied().map(Player::new).collect();
        self.current = 0;
        self.penguin_quota = MAX_PENGUINS - colors.len();
        self.penguins.clear();
        self.stage = Stage::PlacingPenguins;
        Ok(())
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Players in turn order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_index(&self) -> Option<usize> {
        (self.current < self.players.len()).then_some(self.current)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current)
    }

    pub fn current_color(&self) -> Option<PlayerColor> {
        self.current_player().map(Player::color)
    }

    pub fn player(&self, color: PlayerColor) -> Option<&Player> {
        self.players.iter().find(|p| p.color == color)
    }

    /// Position of `color` in the turn order
    pub fn index_of(&self, color: PlayerColor) -> Option<usize> {
        self.players.iter().position(|p| p.color == color)
    }

    pub fn score(&self, color: PlayerColor) -> Option<u32> {
        self.player(color).map(Player::score)
    }

    pub fn penguin_at(&self, coord: Coord) -> Option<PlayerColor> {
        self.penguins.get(&coord).copied()
    }

    pub fn penguin_locations(&self) -> &FxHashMap<Coord, PlayerColor> {
        &self.penguins
    }

    /// Tiles currently holding a penguin
    pub fn occupied(&self) -> FxHashSet<Coord> {
        self.penguins.keys().copied().collect()
    }

    /// Penguins each player places during setup
    pub fn penguin_quota(&self) -> usize {
        self.penguin_quota
    }

    pub fn placements_remaining(&self, color: PlayerColor) -> usize {
        self.player(color)
            .map_or(0, |p| self.penguin_quota.saturating_sub(p.penguins.len()))
    }

    pub fn all_penguins_placed(&self) -> bool {
        self.players
            .iter()
            .all(|p| p.penguins.len() >= self.penguin_quota)
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Tiles reachable from `origin` given every penguin on the board
    pub fn reachable_from(&self, origin: Coord) -> Result<Vec<Coord>, GameError> {
        self.board.reachable_from(origin, &self.occupied())
    }

    /// True if any penguin of `color` can reach at least one tile
    pub fn has_moves(&self, color: PlayerColor) -> bool {
        let occupied = self.occupied();
        self.player(color).is_some_and(|p| {
            p.penguins
                .iter()
                .any(|&pos| self.board.can_move_from(pos, &occupied))
        })
    }

    /// Every move of the current player, penguins in placement order
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.stage != Stage::InPlay {
            return Vec::new();
        }
        let Some(player) = self.current_player() else {
            return Vec::new();
        };

        let occupied = self.occupied();
        let mut moves = Vec::new();
        for &from in &player.penguins {
            if let Ok(targets) = self.board.reachable_from(from, &occupied) {
                moves.extend(targets.into_iter().map(|to| Move::new(from, to)));
            }
        }
        moves
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    /// Put a penguin of `color` on `loc` and pass the turn
    pub fn place_penguin(&mut self, loc: Coord, color: PlayerColor) -> Result<(), GameError> {
        self.require_stage(Stage::PlacingPenguins)?;
        let idx = self.require_turn(color)?;
        if self.players[idx].penguins.len() >= self.penguin_quota {
            return Err(GameError::QuotaReached(color));
        }
        self.require_free_tile(loc)?;

        self.players[idx].penguins.push(loc);
        self.penguins.insert(loc, color);
        self.rotate();
        self.settle_turn();
        Ok(())
    }

    /// Leave the placement stage and begin moving penguins
    pub fn start_play(&mut self) -> Result<(), GameError> {
        self.require_stage(Stage::PlacingPenguins)?;
        self.stage = Stage::InPlay;
        self.settle_turn();
        Ok(())
    }

    /// Move the current player's penguin from `from` to `to`.
    ///
    /// The vacated tile's fish go to the mover and the tile becomes a hole.
    pub fn move_penguin(&mut self, from: Coord, to: Coord) -> Result<(), GameError> {
        self.require_stage(Stage::InPlay)?;
        let idx = self.current_index().ok_or(GameError::NoPlayers)?;
        let color = self.players[idx].color;
        if self.penguins.get(&from) != Some(&color) {
            return Err(GameError::NotYourPenguin(from, color));
        }
        self.require_free_tile(to)?;
        if !self.reachable_from(from)?.contains(&to) {
            return Err(GameError::Unreachable { from, to });
        }

        let fish = self.board.remove_tile_at(from)?;
        let player = &mut self.players[idx];
        player.score += fish as u32;
        if let Some(slot) = player.penguins.iter_mut().find(|p| **p == from) {
            *slot = to;
        }
        self.penguins.remove(&from);
        self.penguins.insert(to, color);

        self.rotate();
        self.settle_turn();
        Ok(())
    }

    /// Pass the turn to the next player able to act
    pub fn advance_to_next_player(&mut self) -> Result<(), GameError> {
        self.require_active()?;
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        self.rotate();
        self.settle_turn();
        Ok(())
    }

    /// Drop the current player and their penguins; holes stay holes
    pub fn remove_current_player(&mut self) -> Result<PlayerColor, GameError> {
        self.require_active()?;
        let idx = self.current_index().ok_or(GameError::NoPlayers)?;

        let removed = self.players.remove(idx);
        self.penguins.retain(|_, owner| *owner != removed.color);
        if self.current >= self.players.len() {
            self.current = 0;
        }
        self.settle_turn();
        Ok(removed.color)
    }

    // ========================================================================
    // GAME OVER
    // ========================================================================

    /// True once the game has ended. Terminal: copies stay over too.
    pub fn is_game_over(&self) -> bool {
        self.stage == Stage::GameOver
    }

    /// Every player holding the top score
    pub fn winners(&self) -> Result<Vec<PlayerColor>, GameError> {
        if self.stage != Stage::GameOver {
            return Err(GameError::NotGameOver);
        }
        let Some(best) = self.players.iter().map(|p| p.score).max() else {
            return Ok(Vec::new());
        };
        Ok(self
            .players
            .iter()
            .filter(|p| p.score == best)
            .map(|p| p.color)
            .collect())
    }

    // ========================================================================
    // TURN BOOKKEEPING
    // ========================================================================

    fn rotate(&mut self) {
        if !self.players.is_empty() {
            self.current = (self.current + 1) % self.players.len();
        }
    }

    /// Latch game over, or skip forward to a player who can act.
    /// Bounded by the number of players.
    fn settle_turn(&mut self) {
        if self.latch_game_over() {
            return;
        }
        for _ in 0..self.players.len() {
            if self.can_act(self.current) {
                return;
            }
            self.rotate();
        }
    }

    fn can_act(&self, idx: usize) -> bool {
        let player = &self.players[idx];
        match self.stage {
            Stage::PlacingPenguins => player.penguins.len() < self.penguin_quota,
            Stage::InPlay => self.has_moves(player.color),
            Stage::NotStarted | Stage::GameOver => false,
        }
    }

    fn latch_game_over(&mut self) -> bool {
        let over = match self.stage {
            Stage::NotStarted => false,
            Stage::GameOver => true,
            Stage::PlacingPenguins => self.players.len() <= 1,
            Stage::InPlay => self.players.len() <= 1 || !self.any_penguin_can_move(),
        };
        if over {
            self.stage = Stage::GameOver;
        }
        over
    }

    fn any_penguin_can_move(&self) -> bool {
        let occupied = self.occupied();
        self.penguins
            .keys()
            .any(|&pos| self.board.can_move_from(pos, &occupied))
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    fn require_stage(&self, stage: Stage) -> Result<(), GameError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(GameError::WrongStage(self.stage))
        }
    }

    fn require_active(&self) -> Result<(), GameError> {
        match self.stage {
            Stage::PlacingPenguins | Stage::InPlay => Ok(()),
            other => Err(GameError::WrongStage(other)),
        }
    }

    fn require_turn(&self, color: PlayerColor) -> Result<usize, GameError> {
        let expected = self.current_color().ok_or(GameError::NoPlayers)?;
        if expected != color {
            return Err(GameError::NotYourTurn {
                expected,
                actual: color,
            });
        }
        Ok(self.current)
    }

    fn require_free_tile(&self, loc: Coord) -> Result<(), GameError> {
        match self.board.tile(loc) {
            None => Err(GameError::OutOfBounds(loc)),
            Some(tile) if tile.is_hole() => Err(GameError::Hole(loc)),
            Some(_) if self.penguins.contains_key(&loc) => Err(GameError::Occupied(loc)),
            Some(_) => Ok(()),
        }
    }
}

// ============================================================================
// DESERIALIZATION
// ============================================================================

/// Serialized form; the occupancy map is rebuilt from the penguin lists
#[derive(Deserialize)]
struct StateRecord {
    stage: Stage,
    board: Board,
    players: Vec<Player>,
    current: usize,
    penguin_quota: usize,
}

impl TryFrom<StateRecord> for GameState {
    type Error = GameError;

    fn try_from(record: StateRecord) -> Result<Self, Self::Error> {
        let mut penguins = FxHashMap::default();
        for player in &record.players {
            for &pos in &player.penguins {
                match record.board.tile(pos) {
                    None => return Err(GameError::OutOfBounds(pos)),
                    Some(tile) if tile.is_hole() => return Err(GameError::Hole(pos)),
                    Some(_) => {}
                }
                if penguins.insert(pos, player.color).is_some() {
                    return Err(GameError::Occupied(pos));
                }
            }
        }
        if !record.players.is_empty() && record.current >= record.players.len() {
            return Err(GameError::NoPlayers);
        }

        Ok(Self {
            stage: record.stage,
            board: record.board,
            players: record.players,
            current: record.current,
            penguin_quota: record.penguin_quota,
            penguins,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
