//! Configuration types for match play
//!
//! Level 4 - Utilities and configuration

use std::path::Path;
use std::time::Duration;

use hexfish_core::{Coord, DEFAULT_DEPTH};
use serde::{Deserialize, Serialize};

/// Default per-call deadline for player queries
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Referee configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefereeConfig {
    /// Deadline for every call into a player, in milliseconds
    pub timeout_ms: u64,
    /// Board height in tiles
    pub rows: usize,
    /// Board width in tiles
    pub cols: usize,
    /// Tiles that start as holes
    pub holes: Vec<Coord>,
    /// Board seed for reproducibility (None = random)
    pub seed: Option<u64>,
}

impl Default for RefereeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            rows: 5,
            cols: 5,
            holes: Vec::new(),
            seed: None,
        }
    }
}

impl RefereeConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Set the per-call deadline; saturates at `u64::MAX` milliseconds
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set board dimensions
    pub fn with_board(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    /// Set initial holes
    pub fn with_holes(mut self, holes: Vec<Coord>) -> Self {
        self.holes = holes;
        self
    }

    /// Set board seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Configuration for the local minimax agent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Turns of its own to look ahead
    pub depth: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
        }
    }
}
