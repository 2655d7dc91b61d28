//! Player handles - the referee's view of an external agent
//!
//! Level 3 - Step-level implementation

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use hexfish_core::{Coord, GameState, MinimaxStrategy, Move, PlayerColor};

use crate::config::AgentConfig;

/// Anything that can play a match.
///
/// Requests receive a snapshot of the game, never the referee's live state.
/// Every call is bounded by the referee's timeout; an error, an illegal
/// answer or a missed deadline on a request gets the player eliminated.
/// Notifications are informational and their failures are only logged.
#[async_trait]
pub trait PlayerHandle: Send {
    /// Name used in logs and results
    fn name(&self) -> &str;

    /// Where to place the next penguin
    async fn request_placement(&mut self, state: GameState) -> anyhow::Result<Coord>;

    /// Which penguin to move and where
    async fn request_move(&mut self, state: GameState) -> anyhow::Result<Move>;

    async fn notify_initial_state(&mut self, _color: PlayerColor, _state: GameState) -> anyhow::Result<()> {
        Ok(())
    }

    async fn notify_placement(&mut self, _at: Coord, _color: PlayerColor) -> anyhow::Result<()> {
        Ok(())
    }

    async fn notify_move(&mut self, _mv: Move, _color: PlayerColor) -> anyhow::Result<()> {
        Ok(())
    }

    async fn notify_player_removed(&mut self, _color: PlayerColor) -> anyhow::Result<()> {
        Ok(())
    }

    async fn notify_game_over(&mut self, _winners: Vec<PlayerColor>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Event pushed to players after the referee accepts something
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    InitialState { color: PlayerColor, state: GameState },
    Placement { at: Coord, color: PlayerColor },
    Move { mv: Move, color: PlayerColor },
    PlayerRemoved { color: PlayerColor },
    GameOver { winners: Vec<PlayerColor> },
}

/// Route a notification to the matching handle method
pub async fn deliver(handle: &mut dyn PlayerHandle, notification: Notification) -> anyhow::Result<()> {
    match notification {
        Notification::InitialState { color, state } => handle.notify_initial_state(color, state).await,
        Notification::Placement { at, color } => handle.notify_placement(at, color).await,
        Notification::Move { mv, color } => handle.notify_move(mv, color).await,
        Notification::PlayerRemoved { color } => handle.notify_player_removed(color).await,
        Notification::GameOver { winners } => handle.notify_game_over(winners).await,
    }
}

// ============================================================================
// LOCAL MINIMAX AGENT
// ============================================================================

/// In-process agent backed by `MinimaxStrategy`
pub struct StrategyPlayer {
    name: String,
    strategy: MinimaxStrategy,
    color: Option<PlayerColor>,
}

impl StrategyPlayer {
    pub fn new(name: impl Into<String>, config: AgentConfig) -> Self {
        Self {
            name: name.into(),
            strategy: MinimaxStrategy::new(config.depth),
            color: None,
        }
    }

    /// Color assigned by the referee, once the match has started
    pub fn color(&self) -> Option<PlayerColor> {
        self.color
    }
}

#[async_trait]
impl PlayerHandle for StrategyPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn request_placement(&mut self, state: GameState) -> anyhow::Result<Coord> {
        self.strategy
            .choose_placement(&state)
            .ok_or_else(|| anyhow!("no free one-fish tile left"))
    }

    async fn request_move(&mut self, state: GameState) -> anyhow::Result<Move> {
        let tracked = state
            .current_color()
            .context("asked to move with nobody to play")?;
        let strategy = self.strategy;

        // The search is CPU bound; keep it off the async workers so the
        // referee's deadline can still fire.
        tokio::task::spawn_blocking(move || strategy.choose_move(&state, tracked))
            .await?
            .ok_or_else(|| anyhow!("no legal move for {}", tracked))
    }

    async fn notify_initial_state(&mut self, color: PlayerColor, _state: GameState) -> anyhow::Result<()> {
        self.color = Some(color);
        Ok(())
    }
}

// ============================================================================
// SCRIPTED AGENT
// ============================================================================

/// Shared record of everything a scripted player was told
pub type NotificationLog = Arc<Mutex<Vec<Notification>>>;

/// Agent that replays fixed answers and records notifications.
/// Running out of script is an error.
pub struct ScriptedPlayer {
    name: String,
    placements: VecDeque<Coord>,
    moves: VecDeque<Move>,
    log: NotificationLog,
}

impl ScriptedPlayer {
    pub fn new(name: impl Into<String>, placements: Vec<Coord>, moves: Vec<Move>) -> Self {
        Self {
            name: name.into(),
            placements: placements.into(),
            moves: moves.into(),
            log: NotificationLog::default(),
        }
    }

    /// Handle on the notification record; stays readable after the player
    /// has been handed to the referee
    pub fn log(&self) -> NotificationLog {
        Arc::clone(&self.log)
    }

    fn record(&self, notification: Notification) -> anyhow::Result<()> {
        self.log
            .lock()
            .map_err(|_| anyhow!("notification log poisoned"))?
            .push(notification);
        Ok(())
    }
}

#[async_trait]
impl PlayerHandle for ScriptedPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn request_placement(&mut self, _state: GameState) -> anyhow::Result<Coord> {
        self.placements
            .pop_front()
            .ok_or_else(|| anyhow!("{} has no placements left", self.name))
    }

    async fn request_move(&mut self, _state: GameState) -> anyhow::Result<Move> {
        self.moves
            .pop_front()
            .ok_or_else(|| anyhow!("{} has no moves left", self.name))
    }

    async fn notify_initial_state(&mut self, color: PlayerColor, state: GameState) -> anyhow::Result<()> {
        self.record(Notification::InitialState { color, state })
    }

    async fn notify_placement(&mut self, at: Coord, color: PlayerColor) -> anyhow::Result<()> {
        self.record(Notification::Placement { at, color })
    }

    async fn notify_move(&mut self, mv: Move, color: PlayerColor) -> anyhow::Result<()> {
        self.record(Notification::Move { mv, color })
    }

    async fn notify_player_removed(&mut self, color: PlayerColor) -> anyhow::Result<()> {
        self.record(Notification::PlayerRemoved { color })
    }

    async fn notify_game_over(&mut self, winners: Vec<PlayerColor>) -> anyhow::Result<()> {
        self.record(Notification::GameOver { winners })
    }
}
