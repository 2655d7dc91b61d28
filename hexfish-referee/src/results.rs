//! Match outcome
//!
//! Level 4 - Utilities and configuration

use hexfish_core::{GameState, PlayerColor};
use serde::{Deserialize, Serialize};

/// A player's place at the table: position in the handle list the referee
/// was given, the handle's name and the color it played
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seat {
    pub index: usize,
    pub name: String,
    pub color: PlayerColor,
}

/// Outcome of a refereed match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Results {
    /// Survivors holding the top score
    pub winners: Vec<Seat>,
    /// Players eliminated for errors, illegal actions or timeouts, in
    /// elimination order
    pub cheaters: Vec<Seat>,
    /// Final score of every survivor, in turn order
    pub scores: Vec<(Seat, u32)>,
    /// State at the end of the match
    pub final_state: GameState,
}

impl Results {
    /// Check if the handle at `index` won
    pub fn is_winner(&self, index: usize) -> bool {
        self.winners.iter().any(|s| s.index == index)
    }

    /// Check if the handle at `index` was eliminated
    pub fn is_cheater(&self, index: usize) -> bool {
        self.cheaters.iter().any(|s| s.index == index)
    }

    pub fn winner_names(&self) -> Vec<&str> {
        self.winners.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn cheater_names(&self) -> Vec<&str> {
        self.cheaters.iter().map(|s| s.name.as_str()).collect()
    }

    /// Final score of the handle at `index`; None if it was eliminated
    pub fn score_of(&self, index: usize) -> Option<u32> {
        self.scores
            .iter()
            .find(|(seat, _)| seat.index == index)
            .map(|&(_, score)| score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(index: usize, name: &str, color: PlayerColor) -> Seat {
        Seat {
            index,
            name: name.to_string(),
            color,
        }
    }

    #[test]
    fn test_results_lookups() {
        let alice = seat(0, "alice", PlayerColor::Red);
        let bob = seat(1, "bob", PlayerColor::White);
        let carol = seat(2, "carol", PlayerColor::Brown);
        let results = Results {
            winners: vec![alice.clone()],
            cheaters: vec![bob],
            scores: vec![(alice, 7), (carol, 4)],
            final_state: GameState::new(),
        };

        assert!(results.is_winner(0));
        assert!(!results.is_winner(2));
        assert!(results.is_cheater(1));
        assert_eq!(results.winner_names(), vec!["alice"]);
        assert_eq!(results.cheater_names(), vec!["bob"]);
        assert_eq!(results.score_of(2), Some(4));
        assert_eq!(results.score_of(1), None);
    }
}
