//! Placement heuristic and depth-bounded adversarial move search
//!
//! The search optimizes a single tracked color: nodes where that color moves
//! take the maximum over their children, every other node takes the minimum.
//! Depth is measured in turns of the tracked color, where being skipped
//! because it has no move still uses up a turn.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::board::Coord;
use crate::game::{GameState, Move, PlayerColor};
use crate::tree::GameTree;

/// Default number of tracked turns to look ahead
pub const DEFAULT_DEPTH: u32 = 2;

// ============================================================================
// MINIMAX STRATEGY
// ============================================================================

/// Minimax player logic
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinimaxStrategy {
    depth: u32,
}

impl Default for MinimaxStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl MinimaxStrategy {
    /// Depth is clamped to at least one turn
    pub fn new(depth: u32) -> Self {
        Self {
            depth: depth.max(1),
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Where to put the next penguin
    pub fn choose_placement(&self, state: &GameState) -> Option<Coord> {
        first_one_fish_tile(state)
    }

    /// Best move for the player to move, judged by `tracked`'s score
    pub fn choose_move(&self, state: &GameState, tracked: PlayerColor) -> Option<Move> {
        if state.is_game_over() || state.index_of(tracked).is_none() {
            return None;
        }
        let tree = GameTree::new(state.clone());

        let values: BTreeMap<Move, i64> = if self.depth == 1 {
            tree.map_children(|child| score_of(child, tracked))
        } else {
            tree.possible_moves()
                .keys()
                .filter_map(|&mv| {
                    let child = tree.next_game_tree(mv).ok()?;
                    let spent = turns_spent(state, child.state(), tracked);
                    let remaining = self.depth.saturating_sub(spent);
                    Some((mv, search(&child, remaining, tracked, i64::MIN, i64::MAX)))
                })
                .collect()
        };

        pick_best(values)
    }
}

// ============================================================================
// PLACEMENT
// ============================================================================

/// First free one-fish tile, scanning rows top to bottom and columns left
/// to right
pub fn first_one_fish_tile(state: &GameState) -> Option<Coord> {
    let board = state.board();
    board.coords().find(|&coord| {
        board.is_present(coord)
            && board.fish_at(coord).ok() == Some(1)
            && state.penguin_at(coord).is_none()
    })
}

// ============================================================================
// SEARCH
// ============================================================================

fn score_of(state: &GameState, tracked: PlayerColor) -> i64 {
    state.score(tracked).map_or(0, i64::from)
}

/// Minimax with alpha-beta pruning; `remaining` counts tracked turns
fn search(node: &GameTree, remaining: u32, tracked: PlayerColor, mut alpha: i64, mut beta: i64) -> i64 {
    let state = node.state();
    if remaining == 0 || state.is_game_over() {
        return score_of(state, tracked);
    }
    let Some(mover) = state.current_color() else {
        return score_of(state, tracked);
    };

    let children = node.possible_moves();
    if children.is_empty() {
        return score_of(state, tracked);
    }

    let maximizing = mover == tracked;
    let mut best = if maximizing { i64::MIN } else { i64::MAX };

    for &mv in children.keys() {
        let Ok(child) = node.next_game_tree(mv) else {
            continue;
        };
        let spent = turns_spent(state, child.state(), tracked);
        let value = search(&child, remaining.saturating_sub(spent), tracked, alpha, beta);

        if maximizing {
            best = best.max(value);
            alpha = alpha.max(best);
        } else {
            best = best.min(value);
            beta = beta.min(best);
        }
        if alpha >= beta {
            break;
        }
    }

    best
}

/// Tracked turns consumed going from `before` to `after`.
///
/// A turn is charged when the current index resets to the tracked seat's own
/// turn being spent, or when it fails to stop at or before that seat. Seats
/// are measured forward from the mover, so "did not decrease past the
/// tracked seat" still holds when the pointer wraps around the table:
///
/// - the tracked color was the mover: one turn;
/// - the tracked seat lies strictly between the mover and the next current
///   seat, counting forward: skipped for lack of a move, one turn;
/// - the pointer lands back on the mover: a full lap, so every other seat,
///   the tracked one included, was skipped;
/// - otherwise: none.
fn turns_spent(before: &GameState, after: &GameState, tracked: PlayerColor) -> u32 {
    if before.current_color() == Some(tracked) {
        return 1;
    }
    let (Some(mover), Some(seat)) = (before.current_index(), before.index_of(tracked)) else {
        return 0;
    };
    let Some(next) = after.current_index() else {
        return 0;
    };

    let n = before.players().len();
    let ahead = |idx: usize| (idx + n - mover) % n;
    let landed = if next == mover { n } else { ahead(next) };
    let skipped = ahead(seat) > 0 && ahead(seat) < landed;
    u32::from(skipped)
}

/// Highest value wins; ties go to the lowest origin row, then column, then
/// the lowest destination row, then column
fn pick_best(values: BTreeMap<Move, i64>) -> Option<Move> {
    values
        .into_iter()
        .max_by(|(ma, va), (mb, vb)| va.cmp(vb).then_with(|| tie_break(mb, ma)))
        .map(|(mv, _)| mv)
}

fn tie_break(a: &Move, b: &Move) -> Ordering {
    let key = |m: &Move| (m.from.row, m.from.col, m.to.row, m.to.col);
    key(a).cmp(&key(b))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::game::PlayerColor::{Brown, Red, White};

    fn c(col: i32, row: i32) -> Coord {
        Coord::new(col, row)
    }

    #[test]
    fn test_placement_first_one_fish_row_major() {
        let board = Board::from_fish(&[vec![3, 2, 1], vec![1, 4, 5]]).unwrap();
        let mut state = GameState::with_players(board, &[Red, White]).unwrap();
        let strategy = MinimaxStrategy::default();

        assert_eq!(strategy.choose_placement(&state), Some(c(2, 0)));
        state.place_penguin(c(2, 0), Red).unwrap();
        assert_eq!(strategy.choose_placement(&state), Some(c(0, 1)));
        state.place_penguin(c(0, 1), White).unwrap();
        assert_eq!(strategy.choose_placement(&state), None);
    }

    #[test]
    fn test_placement_skips_holes() {
        let board = Board::from_fish(&[vec![0, 2], vec![1, 1]]).unwrap();
        let state = GameState::with_players(board, &[Red, White]).unwrap();
        assert_eq!(first_one_fish_tile(&state), Some(c(0, 1)));
    }

    /// Red on the five-fish tile, White in the far corner
    fn greedy_game() -> GameState {
        let board = Board::from_fish(&[
            vec![1, 1, 1],
            vec![5, 1, 3],
            vec![1, 2, 1],
            vec![1, 1, 1],
            vec![1, 1, 4],
        ])
        .unwrap();
        let mut game = GameState::with_players(board, &[Red, White]).unwrap();
        game.place_penguin(c(0, 1), Red).unwrap();
        game.place_penguin(c(2, 4), White).unwrap();
        game.start_play().unwrap();
        game
    }

    #[test]
    fn test_depth_one_tie_break() {
        // Every move collects the same five fish, so the tie-break decides:
        // lowest destination row, then lowest column.
        let game = greedy_game();
        let strategy = MinimaxStrategy::new(1);
        let mv = strategy.choose_move(&game, Red).unwrap();
        assert_eq!(mv.from, c(0, 1));

        let best = game
            .legal_moves()
            .into_iter()
            .min_by_key(|m| (m.to.row, m.to.col))
            .unwrap();
        assert_eq!(mv, best);
    }

    #[test]
    fn test_depth_one_prefers_richer_origin() {
        let board = Board::from_fish(&[vec![1, 1, 1], vec![1, 1, 1], vec![1, 1, 1], vec![4, 1, 1]])
            .unwrap();
        let mut game = GameState::with_players(board, &[Red, White]).unwrap();
        game.place_penguin(c(0, 0), Red).unwrap();
        game.place_penguin(c(2, 2), White).unwrap();
        game.place_penguin(c(0, 3), Red).unwrap();
        game.place_penguin(c(2, 0), White).unwrap();
        game.start_play().unwrap();

        let mv = MinimaxStrategy::new(1).choose_move(&game, Red).unwrap();
        assert_eq!(mv.from, c(0, 3));
    }

    #[test]
    fn test_deeper_search_is_legal_and_deterministic() {
        let game = greedy_game();
        let strategy = MinimaxStrategy::new(2);
        let first = strategy.choose_move(&game, Red).unwrap();
        assert!(game.legal_moves().contains(&first));
        for _ in 0..3 {
            assert_eq!(strategy.choose_move(&game, Red), Some(first));
        }
    }

    #[test]
    fn test_no_move_when_game_over() {
        let board = Board::uniform(1, 2, 1).unwrap();
        let mut game = GameState::with_players(board, &[Red, White]).unwrap();
        game.place_penguin(c(0, 0), Red).unwrap();
        game.place_penguin(c(1, 0), White).unwrap();
        game.start_play().unwrap();
        assert_eq!(MinimaxStrategy::new(3).choose_move(&game, Red), None);
    }

    #[test]
    fn test_depth_clamped() {
        assert_eq!(MinimaxStrategy::new(0).depth(), 1);
    }

    #[test]
    fn test_turns_spent_counts_skips() {
        let board = Board::from_fish(&[
            vec![1, 1, 1],
            vec![1, 0, 0],
            vec![1, 1, 0],
            vec![1, 0, 0],
            vec![1, 1, 1],
        ])
        .unwrap();
        let mut before = GameState::with_players(board, &[Red, White, Brown]).unwrap();
        before.place_penguin(c(0, 0), Red).unwrap();
        before.place_penguin(c(2, 0), White).unwrap();
        before.place_penguin(c(0, 4), Brown).unwrap();
        before.start_play().unwrap();

        let mut after = before.clone();
        after.move_penguin(c(0, 0), c(0, 2)).unwrap();
        assert_eq!(after.current_color(), Some(Brown));

        assert_eq!(turns_spent(&before, &after, Red), 1);
        assert_eq!(turns_spent(&before, &after, White), 1);
        assert_eq!(turns_spent(&before, &after, Brown), 0);
    }

    #[test]
    fn test_turns_spent_wraps_around_the_table() {
        // Red starts boxed in at (0, 0)
        let board = Board::from_fish(&[
            vec![1, 0, 1],
            vec![0, 1, 1],
            vec![0, 1, 1],
            vec![0, 1, 1],
            vec![0, 1, 1],
        ])
        .unwrap();
        let mut game = GameState::with_players(board, &[Red, White, Brown]).unwrap();
        game.place_penguin(c(0, 0), Red).unwrap();
        game.place_penguin(c(2, 0), White).unwrap();
        game.place_penguin(c(1, 4), Brown).unwrap();
        game.start_play().unwrap();
        assert_eq!(game.current_color(), Some(White));
        game.move_penguin(c(2, 0), c(2, 2)).unwrap();
        assert_eq!(game.current_color(), Some(Brown));

        // Brown is the last seat; the pointer wraps past Red to White
        let before = game.clone();
        game.move_penguin(c(1, 4), c(1, 2)).unwrap();
        assert_eq!(game.current_color(), Some(White));

        assert_eq!(turns_spent(&before, &game, Brown), 1);
        assert_eq!(turns_spent(&before, &game, Red), 1);
        assert_eq!(turns_spent(&before, &game, White), 0);
    }

    #[test]
    fn test_tie_break_order() {
        let a = Move::new(c(2, 0), c(2, 2));
        let b = Move::new(c(0, 1), c(0, 3));
        // Lower origin row wins despite higher column
        assert_eq!(tie_break(&a, &b), Ordering::Less);
        let values: BTreeMap<Move, i64> = [(a, 3), (b, 3)].into_iter().collect();
        assert_eq!(pick_best(values), Some(a));
    }

    #[test]
    fn test_minimax_avoids_trap() {
        // The chosen root move carries the best maximin value
        let board = Board::from_fish(&[vec![2, 1], vec![1, 1], vec![3, 1], vec![1, 1]]).unwrap();
        let mut game = GameState::with_players(board, &[Red, White]).unwrap();
        game.place_penguin(c(0, 0), Red).unwrap();
        game.place_penguin(c(1, 3), White).unwrap();
        game.start_play().unwrap();

        let strategy = MinimaxStrategy::new(2);
        let chosen = strategy.choose_move(&game, Red).unwrap();

        let tree = GameTree::new(game.clone());
        let mut best_value = i64::MIN;
        let mut chosen_value = i64::MIN;
        for &mv in tree.possible_moves().keys() {
            let child = tree.next_game_tree(mv).unwrap();
            let remaining = 2 - turns_spent(&game, child.state(), Red);
            let value = search(&child, remaining, Red, i64::MIN, i64::MAX);
            best_value = best_value.max(value);
            if mv == chosen {
                chosen_value = value;
            }
        }
        assert_eq!(chosen_value, best_value);
    }
}
