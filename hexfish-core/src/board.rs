//! Hex board geometry with double-height offset coordinates
//!
//! Tiles are stored row-major. Odd rows are shifted half a tile to the right,
//! so moving straight up or down changes the row by two and keeps the column,
//! while the four diagonals change the row by one and shift the column
//! depending on the parity of the starting row.

use std::fmt;

use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Largest number of fish a tile can carry
pub const MAX_FISH: u8 = 5;

/// Tile address: column and row
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub col: i32,
    pub row: i32,
}

impl Coord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Neighbor one step away in `direction` (may be off the board)
    pub fn neighbor(&self, direction: Direction) -> Coord {
        let (dc, dr) = direction.offset(self.row);
        Coord::new(self.col + dc, self.row + dr)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// The six straight lines a penguin can travel along
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    UpRight,
    DownRight,
    Down,
    DownLeft,
    UpLeft,
}

impl Direction {
    /// Clockwise from straight up
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::UpRight,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::UpLeft,
    ];

    /// (dcol, drow) for a step taken from a tile in `row`
    pub fn offset(self, row: i32) -> (i32, i32) {
        let odd = row.rem_euclid(2) == 1;
        match self {
            Direction::Up => (0, -2),
            Direction::Down => (0, 2),
            Direction::UpLeft => (if odd { 0 } else { -1 }, -1),
            Direction::UpRight => (if odd { 1 } else { 0 }, -1),
            Direction::DownLeft => (if odd { 0 } else { -1 }, 1),
            Direction::DownRight => (if odd { 1 } else { 0 }, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::UpRight => Direction::DownLeft,
            Direction::DownRight => Direction::UpLeft,
            Direction::Down => Direction::Up,
            Direction::DownLeft => Direction::UpRight,
            Direction::UpLeft => Direction::DownRight,
        }
    }
}

/// A single hexagonal tile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    fish: u8,
    present: bool,
}

impl Tile {
    pub fn with_fish(fish: u8) -> Result<Self, GameError> {
        if fish == 0 || fish > MAX_FISH {
            return Err(GameError::InvalidFishCount(fish));
        }
        Ok(Self { fish, present: true })
    }

    pub const fn hole() -> Self {
        Self { fish: 0, present: false }
    }

    /// Fish on the tile; holes carry none
    pub fn fish(&self) -> u8 {
        if self.present {
            self.fish
        } else {
            0
        }
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn is_hole(&self) -> bool {
        !self.present
    }
}

/// Rectangular grid of tiles
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    tiles: Vec<Tile>,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Board where every tile carries the same number of fish
    pub fn uniform(rows: usize, cols: usize, fish: u8) -> Result<Self, GameError> {
        if rows == 0 || cols == 0 {
            return Err(GameError::DegenerateBoard);
        }
        let tile = Tile::with_fish(fish)?;
        Ok(Self {
            rows,
            cols,
            tiles: vec![tile; rows * cols],
        })
    }

    /// Board from explicit fish counts, one inner vector per row; 0 is a hole
    pub fn from_fish(counts: &[Vec<u8>]) -> Result<Self, GameError> {
        let rows = counts.len();
        let cols = counts.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(GameError::DegenerateBoard);
        }

        let mut tiles = Vec::with_capacity(rows * cols);
        for row in counts {
            if row.len() != cols {
                return Err(GameError::RaggedRows);
            }
            for &fish in row {
                tiles.push(if fish == 0 { Tile::hole() } else { Tile::with_fish(fish)? });
            }
        }

        Ok(Self { rows, cols, tiles })
    }

    /// Random board with the given holes and at least `min_one_fish` tiles
    /// carrying exactly one fish.
    ///
    /// The first `min_one_fish` non-hole tiles in row-major order are forced
    /// to one fish; every other tile draws uniformly from `1..=MAX_FISH`.
    pub fn generate<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        holes: &[Coord],
        min_one_fish: usize,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if rows == 0 || cols == 0 {
            return Err(GameError::DegenerateBoard);
        }

        let mut board = Self {
            rows,
            cols,
            tiles: vec![Tile { fish: 1, present: true }; rows * cols],
        };

        for &hole in holes {
            let idx = board.index(hole).ok_or(GameError::OutOfBounds(hole))?;
            board.tiles[idx] = Tile::hole();
        }

        let available = board.tiles.iter().filter(|t| t.present).count();
        if available < min_one_fish {
            return Err(GameError::NotEnoughTiles {
                needed: min_one_fish,
                available,
            });
        }

        let mut forced = 0;
        for tile in board.tiles.iter_mut().filter(|t| t.present) {
            tile.fish = if forced < min_one_fish {
                forced += 1;
                1
            } else {
                rng.gen_range(1..=MAX_FISH)
            };
        }

        Ok(board)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Check if this coordinate is on the board
    pub fn contains(&self, coord: Coord) -> bool {
        self.index(coord).is_some()
    }

    pub fn tile(&self, coord: Coord) -> Option<Tile> {
        self.index(coord).map(|idx| self.tiles[idx])
    }

    /// Fish on a tile (0 for holes)
    pub fn fish_at(&self, coord: Coord) -> Result<u8, GameError> {
        self.tile(coord)
            .map(|t| t.fish())
            .ok_or(GameError::OutOfBounds(coord))
    }

    /// True for in-bounds tiles that are not holes
    pub fn is_present(&self, coord: Coord) -> bool {
        self.tile(coord).is_some_and(|t| t.present)
    }

    /// Every coordinate, row by row, columns ascending within a row
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| {
            (0..cols).map(move |col| Coord::new(col as i32, row as i32))
        })
    }

    /// Sum of fish over all present tiles
    pub fn total_fish(&self) -> u32 {
        self.tiles.iter().map(|t| t.fish() as u32).sum()
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if coord.col < 0 || coord.row < 0 {
            return None;
        }
        let (col, row) = (coord.col as usize, coord.row as usize);
        (col < self.cols && row < self.rows).then(|| row * self.cols + col)
    }

    // ========================================================================
    // REACHABILITY
    // ========================================================================

    /// Tiles reachable in straight lines from `origin`.
    ///
    /// Each of the six lines stops before the first hole, occupied tile or
    /// board edge. Directions are visited clockwise from straight up, and
    /// tiles within a direction are listed nearest first.
    pub fn reachable_from(
        &self,
        origin: Coord,
        occupied: &FxHashSet<Coord>,
    ) -> Result<Vec<Coord>, GameError> {
        self.check_present(origin)?;
        let mut reachable = Vec::new();
        for direction in Direction::ALL {
            self.walk_into(origin, direction, occupied, &mut reachable);
        }
        Ok(reachable)
    }

    /// Tiles reachable from `origin` along a single direction
    pub fn walk(
        &self,
        origin: Coord,
        direction: Direction,
        occupied: &FxHashSet<Coord>,
    ) -> Result<Vec<Coord>, GameError> {
        self.check_present(origin)?;
        let mut reachable = Vec::new();
        self.walk_into(origin, direction, occupied, &mut reachable);
        Ok(reachable)
    }

    /// True if at least one tile can be reached from `origin`
    pub fn can_move_from(&self, origin: Coord, occupied: &FxHashSet<Coord>) -> bool {
        self.is_present(origin)
            && Direction::ALL.iter().any(|&d| {
                let next = origin.neighbor(d);
                self.is_present(next) && !occupied.contains(&next)
            })
    }

    fn walk_into(
        &self,
        origin: Coord,
        direction: Direction,
        occupied: &FxHashSet<Coord>,
        out: &mut Vec<Coord>,
    ) {
        let mut current = origin;
        loop {
            current = current.neighbor(direction);
            if !self.is_present(current) || occupied.contains(&current) {
                break;
            }
            out.push(current);
        }
    }

    fn check_present(&self, coord: Coord) -> Result<(), GameError> {
        match self.tile(coord) {
            None => Err(GameError::OutOfBounds(coord)),
            Some(t) if t.is_hole() => Err(GameError::Hole(coord)),
            Some(_) => Ok(()),
        }
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Turn a tile into a permanent hole, returning the fish it carried
    pub fn remove_tile_at(&mut self, coord: Coord) -> Result<u8, GameError> {
        self.check_present(coord)?;
        let idx = self.index(coord).ok_or(GameError::OutOfBounds(coord))?;
        let fish = self.tiles[idx].fish;
        self.tiles[idx] = Tile::hole();
        Ok(fish)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn no_penguins() -> FxHashSet<Coord> {
        FxHashSet::default()
    }

    #[test]
    fn test_direction_offsets() {
        let even = Coord::new(1, 2);
        assert_eq!(even.neighbor(Direction::Up), Coord::new(1, 0));
        assert_eq!(even.neighbor(Direction::Down), Coord::new(1, 4));
        assert_eq!(even.neighbor(Direction::UpLeft), Coord::new(0, 1));
        assert_eq!(even.neighbor(Direction::UpRight), Coord::new(1, 1));
        assert_eq!(even.neighbor(Direction::DownLeft), Coord::new(0, 3));
        assert_eq!(even.neighbor(Direction::DownRight), Coord::new(1, 3));

        let odd = Coord::new(1, 3);
        assert_eq!(odd.neighbor(Direction::UpLeft), Coord::new(1, 2));
        assert_eq!(odd.neighbor(Direction::UpRight), Coord::new(2, 2));
        assert_eq!(odd.neighbor(Direction::DownLeft), Coord::new(1, 4));
        assert_eq!(odd.neighbor(Direction::DownRight), Coord::new(2, 4));
    }

    #[test]
    fn test_opposite_undoes_step() {
        for row in 0..4 {
            let start = Coord::new(2, row);
            for d in Direction::ALL {
                assert_eq!(start.neighbor(d).neighbor(d.opposite()), start);
            }
        }
    }

    #[test]
    fn test_from_fish() {
        let board = Board::from_fish(&[vec![1, 0, 3], vec![5, 2, 4]]).unwrap();
        assert_eq!(board.rows(), 2);
        assert_eq!(board.cols(), 3);
        assert_eq!(board.fish_at(Coord::new(2, 0)).unwrap(), 3);
        assert!(!board.is_present(Coord::new(1, 0)));
        assert_eq!(board.fish_at(Coord::new(1, 0)).unwrap(), 0);
        assert_eq!(board.total_fish(), 15);
    }

    #[test]
    fn test_constructor_errors() {
        assert_eq!(Board::from_fish(&[]), Err(GameError::DegenerateBoard));
        assert_eq!(
            Board::from_fish(&[vec![1, 2], vec![3]]),
            Err(GameError::RaggedRows)
        );
        assert_eq!(
            Board::from_fish(&[vec![6]]),
            Err(GameError::InvalidFishCount(6))
        );
        assert_eq!(Board::uniform(0, 3, 1), Err(GameError::DegenerateBoard));
    }

    #[test]
    fn test_generate_min_one_fish_and_holes() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let holes = [Coord::new(0, 0), Coord::new(2, 1)];
        let board = Board::generate(3, 4, &holes, 5, &mut rng).unwrap();

        assert!(!board.is_present(Coord::new(0, 0)));
        assert!(!board.is_present(Coord::new(2, 1)));
        let ones = board
            .coords()
            .filter(|&c| board.is_present(c) && board.fish_at(c).unwrap() == 1)
            .count();
        assert!(ones >= 5);
        // First present tile in row-major order is forced to one fish
        assert_eq!(board.fish_at(Coord::new(1, 0)).unwrap(), 1);
        for c in board.coords().filter(|&c| board.is_present(c)) {
            let fish = board.fish_at(c).unwrap();
            assert!((1..=MAX_FISH).contains(&fish));
        }
    }

    #[test]
    fn test_generate_not_enough_tiles() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = Board::generate(2, 2, &[Coord::new(1, 1)], 4, &mut rng).unwrap_err();
        assert_eq!(err, GameError::NotEnoughTiles { needed: 4, available: 3 });

        let err = Board::generate(2, 2, &[Coord::new(5, 5)], 1, &mut rng).unwrap_err();
        assert_eq!(err, GameError::OutOfBounds(Coord::new(5, 5)));
    }

    #[test]
    fn test_reachable_open_board() {
        let board = Board::uniform(6, 3, 2).unwrap();
        let reachable = board.reachable_from(Coord::new(1, 2), &no_penguins()).unwrap();

        let expected = vec![
            Coord::new(1, 0), // up
            Coord::new(1, 1), // up-right
            Coord::new(2, 0),
            Coord::new(1, 3), // down-right
            Coord::new(2, 4),
            Coord::new(2, 5),
            Coord::new(1, 4), // down
            Coord::new(0, 3), // down-left
            Coord::new(0, 4),
            Coord::new(0, 1), // up-left
            Coord::new(0, 0),
        ];
        assert_eq!(reachable, expected);
    }

    #[test]
    fn test_reachable_stops_at_holes_and_penguins() {
        let mut board = Board::uniform(6, 3, 2).unwrap();
        board.remove_tile_at(Coord::new(1, 4)).unwrap();

        let mut occupied = FxHashSet::default();
        occupied.insert(Coord::new(1, 1));

        let reachable = board.reachable_from(Coord::new(1, 2), &occupied).unwrap();
        assert!(!reachable.contains(&Coord::new(1, 1)));
        assert!(!reachable.contains(&Coord::new(2, 0)));
        assert!(!reachable.contains(&Coord::new(1, 4)));
        assert!(reachable.contains(&Coord::new(1, 0)));
    }

    #[test]
    fn test_reachable_from_invalid_origin() {
        let mut board = Board::uniform(2, 2, 1).unwrap();
        assert_eq!(
            board.reachable_from(Coord::new(2, 0), &no_penguins()),
            Err(GameError::OutOfBounds(Coord::new(2, 0)))
        );
        board.remove_tile_at(Coord::new(0, 0)).unwrap();
        assert_eq!(
            board.reachable_from(Coord::new(0, 0), &no_penguins()),
            Err(GameError::Hole(Coord::new(0, 0)))
        );
    }

    #[test]
    fn test_walk_symmetry() {
        let board = Board::uniform(7, 5, 3).unwrap();
        let empty = no_penguins();

        for origin in board.coords() {
            for d in Direction::ALL {
                let forward = board.walk(origin, d, &empty).unwrap();
                let Some(&far) = forward.last() else { continue };
                let back = board.walk(far, d.opposite(), &empty).unwrap();

                // Everything between the endpoints, plus the origin itself,
                // is seen again on the way back, with no gaps.
                let mut expected: Vec<Coord> = forward[..forward.len() - 1]
                    .iter()
                    .rev()
                    .copied()
                    .collect();
                expected.push(origin);
                assert_eq!(&back[..expected.len()], expected.as_slice());
            }
        }
    }

    #[test]
    fn test_remove_tile() {
        let mut board = Board::from_fish(&[vec![4, 2]]).unwrap();
        assert_eq!(board.remove_tile_at(Coord::new(0, 0)), Ok(4));
        assert_eq!(
            board.remove_tile_at(Coord::new(0, 0)),
            Err(GameError::Hole(Coord::new(0, 0)))
        );
        assert_eq!(
            board.remove_tile_at(Coord::new(0, 3)),
            Err(GameError::OutOfBounds(Coord::new(0, 3)))
        );
    }

    #[test]
    fn test_copy_is_independent() {
        let original = Board::uniform(2, 2, 3).unwrap();
        let mut copy = original.clone();
        copy.remove_tile_at(Coord::new(1, 1)).unwrap();
        assert!(original.is_present(Coord::new(1, 1)));
        assert!(!copy.is_present(Coord::new(1, 1)));
    }
}
