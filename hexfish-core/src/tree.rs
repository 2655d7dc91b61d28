//! Game tree over `GameState`
//!
//! Nodes share their ancestors through `Arc`, so stepping forward is cheap and
//! undo simply hands back the parent. Children are generated on first request
//! and cached on the node.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::error::GameError;
use crate::game::{GameState, Move};

/// A node in the game tree
#[derive(Clone, Debug)]
pub struct GameTree {
    node: Arc<TreeNode>,
}

#[derive(Debug)]
struct TreeNode {
    state: GameState,
    /// Parent node (None for root)
    parent: Option<GameTree>,
    /// Move that led to this node (None for root)
    incoming_move: Option<Move>,
    children: OnceLock<BTreeMap<Move, GameState>>,
}

impl GameTree {
    /// Root node for `state`
    pub fn new(state: GameState) -> Self {
        Self::from_parts(state, None, None)
    }

    fn from_parts(state: GameState, parent: Option<GameTree>, incoming_move: Option<Move>) -> Self {
        Self {
            node: Arc::new(TreeNode {
                state,
                parent,
                incoming_move,
                children: OnceLock::new(),
            }),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.node.state
    }

    pub fn incoming_move(&self) -> Option<Move> {
        self.node.incoming_move
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    /// Number of moves between the root and this node
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.node.parent.as_ref();
        while let Some(parent) = cursor {
            depth += 1;
            cursor = parent.node.parent.as_ref();
        }
        depth
    }

    /// Every legal move of the current player and the state it leads to
    pub fn possible_moves(&self) -> &BTreeMap<Move, GameState> {
        self.node
            .children
            .get_or_init(|| expand(&self.node.state))
    }

    /// Child reached by playing `mv`
    pub fn next_game_tree(&self, mv: Move) -> Result<GameTree, GameError> {
        let state = self
            .possible_moves()
            .get(&mv)
            .cloned()
            .ok_or(GameError::UnknownMove(mv))?;
        Ok(Self::from_parts(state, Some(self.clone()), Some(mv)))
    }

    /// Parent node; fails on the root
    pub fn undo_previous_move(&self) -> Result<GameTree, GameError> {
        self.node.parent.clone().ok_or(GameError::AtRoot)
    }

    /// Path from the root: each move with the state it was played in
    pub fn previous_moves(&self) -> Vec<(Move, GameState)> {
        let mut path = Vec::new();
        let mut cursor = self;
        while let (Some(parent), Some(mv)) = (cursor.node.parent.as_ref(), cursor.node.incoming_move) {
            path.push((mv, parent.state().clone()));
            cursor = parent;
        }
        path.reverse();
        path
    }

    /// Apply `f` to every successor state
    pub fn map_children<T, F>(&self, f: F) -> BTreeMap<Move, T>
    where
        F: Fn(&GameState) -> T,
    {
        self.possible_moves()
            .iter()
            .map(|(mv, state)| (*mv, f(state)))
            .collect()
    }
}

fn expand(state: &GameState) -> BTreeMap<Move, GameState> {
    state
        .legal_moves()
        .into_iter()
        .filter_map(|mv| {
            let mut next = state.clone();
            next.move_penguin(mv.from, mv.to).ok().map(|_| (mv, next))
        })
        .collect()
}
