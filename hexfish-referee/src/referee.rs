//! Referee - runs one match between player handles
//!
//! Level 1 - Orchestration (run_game)
//! Level 2 - Phases (placement, movement, finish)
//! Level 3 - Steps (elimination, broadcast); player calls live in `proxy`

use std::time::Duration;

use hexfish_core::{
    Board, GameError, GameState, GameTree, Move, PlayerColor, MAX_PENGUINS, MAX_PLAYERS, MIN_PLAYERS,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::RefereeConfig;
use crate::error::RefereeError;
use crate::player::{Notification, PlayerHandle};
use crate::proxy::{Fault, PlayerProxy};
use crate::results::{Results, Seat};

/// Authoritative owner of a match.
///
/// Players only ever see snapshots. Each handle runs on its own task, every
/// request is bounded by the configured timeout, and a player that errors,
/// answers illegally or runs out the clock is removed from the game.
pub struct Referee {
    config: RefereeConfig,
}

impl Referee {
    pub fn new(config: RefereeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RefereeConfig {
        &self.config
    }

    /// Run a full match. Handles get colors in list order.
    ///
    /// Errors only for a bad player count, a board the configuration cannot
    /// produce, or a broken state machine; player misbehavior ends up in
    /// `Results::cheaters`.
    pub async fn run_game(&self, players: Vec<Box<dyn PlayerHandle>>) -> Result<Results, RefereeError> {
        let count = players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(RefereeError::PlayerCount(count));
        }

        let board = self.build_board(count)?;
        let seats: Vec<Seat> = players
            .iter()
            .zip(PlayerColor::ALL)
            .enumerate()
            .map(|(index, (handle, color))| Seat {
                index,
                name: handle.name().to_string(),
                color,
            })
            .collect();
        let colors: Vec<PlayerColor> = seats.iter().map(|s| s.color).collect();
        let state = GameState::with_players(board, &colors)?;

        info!(
            players = count,
            rows = self.config.rows,
            cols = self.config.cols,
            timeout_ms = self.config.timeout_ms,
            "starting match"
        );

        let timeout = self.config.timeout();
        let proxies = seats
            .into_iter()
            .zip(players)
            .map(|(seat, handle)| PlayerProxy::spawn(seat, handle, timeout))
            .collect();
        let mut game = Match {
            state,
            proxies,
            cheaters: Vec::new(),
            timeout,
        };

        game.announce_initial_state();
        let played = game.play().await;
        match played {
            Ok(()) => game.finish().await,
            Err(err) => {
                game.abort_all();
                Err(err)
            }
        }
    }

    /// Fresh board with room for every penguin on a one-fish tile
    fn build_board(&self, players: usize) -> Result<Board, GameError> {
        let quota = MAX_PENGUINS - players;
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Board::generate(
            self.config.rows,
            self.config.cols,
            &self.config.holes,
            players * quota,
            &mut rng,
        )
    }
}

// ============================================================================
// MATCH STATE
// ============================================================================

/// Live match: the authoritative state plus the surviving players' tasks
struct Match {
    state: GameState,
    proxies: Vec<PlayerProxy>,
    cheaters: Vec<Seat>,
    timeout: Duration,
}

impl Match {
    // ========================================================================
    // PHASES
    // ========================================================================

    async fn play(&mut self) -> Result<(), RefereeError> {
        self.run_placement().await?;
        if !self.state.is_game_over() {
            self.state.start_play()?;
        }
        self.run_movement().await
    }

    async fn run_placement(&mut self) -> Result<(), RefereeError> {
        while !self.state.is_game_over() && !self.state.all_penguins_placed() {
            let color = self.state.current_color().ok_or(GameError::NoPlayers)?;
            let snapshot = self.state.clone();
            let answer = self.proxy(color)?.request_placement(snapshot).await;

            let placed = answer.and_then(|at| {
                self.state
                    .place_penguin(at, color)
                    .map(|()| at)
                    .map_err(Fault::Illegal)
            });
            match placed {
                Ok(at) => {
                    debug!(%color, %at, "penguin placed");
                    self.broadcast(Notification::Placement { at, color });
                }
                Err(fault) => self.eliminate(color, fault)?,
            }
        }
        Ok(())
    }

    async fn run_movement(&mut self) -> Result<(), RefereeError> {
        while !self.state.is_game_over() {
            let color = self.state.current_color().ok_or(GameError::NoPlayers)?;
            let snapshot = self.state.clone();
            let answer = self.proxy(color)?.request_move(snapshot).await;

            match answer.and_then(|mv| self.apply_move(mv)) {
                Ok(mv) => {
                    debug!(%color, %mv, "penguin moved");
                    self.broadcast(Notification::Move { mv, color });
                }
                Err(fault) => self.eliminate(color, fault)?,
            }
        }
        Ok(())
    }

    /// Announce the result, then give every survivor one timeout to drain
    /// its queued notifications before its task is stopped
    async fn finish(self) -> Result<Results, RefereeError> {
        let winning_colors = self.state.winners()?;
        self.broadcast(Notification::GameOver {
            winners: winning_colors.clone(),
        });

        let seats: Vec<Seat> = self.proxies.iter().map(|p| p.seat().clone()).collect();
        // A timeout past the clock's range means no deadline at all
        let deadline = Instant::now().checked_add(self.timeout);
        // Tasks drain in parallel; the shared deadline bounds the whole wait
        for proxy in self.proxies {
            proxy.shutdown(deadline).await;
        }

        let winners: Vec<Seat> = seats
            .iter()
            .filter(|s| winning_colors.contains(&s.color))
            .cloned()
            .collect();
        let scores = seats
            .into_iter()
            .map(|s| {
                let score = self.state.score(s.color).unwrap_or(0);
                (s, score)
            })
            .collect();

        info!(
            winners = ?winners.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            cheaters = ?self.cheaters.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            "match finished"
        );

        Ok(Results {
            winners,
            cheaters: self.cheaters,
            scores,
            final_state: self.state,
        })
    }

    // ========================================================================
    // STEPS
    // ========================================================================

    /// Validate a move against the game tree and adopt the resulting state
    fn apply_move(&mut self, mv: Move) -> Result<Move, Fault> {
        let next = GameTree::new(self.state.clone())
            .next_game_tree(mv)
            .map_err(|_| Fault::Illegal(self.explain_illegal(mv)))?;
        self.state = next.state().clone();
        Ok(mv)
    }

    /// Specific reason a move is not among the legal successors
    fn explain_illegal(&self, mv: Move) -> GameError {
        let mut scratch = self.state.clone();
        match scratch.move_penguin(mv.from, mv.to) {
            Err(err) => err,
            Ok(()) => GameError::UnknownMove(mv),
        }
    }

    /// Remove the current player and stop its task, abandoning any call
    /// still running there
    fn eliminate(&mut self, color: PlayerColor, fault: Fault) -> Result<(), RefereeError> {
        let removed = self.state.remove_current_player()?;
        debug_assert_eq!(removed, color);

        if let Some(pos) = self.proxies.iter().position(|p| p.seat().color == removed) {
            let proxy = self.proxies.remove(pos);
            warn!(player = %proxy.seat().name, color = %removed, %fault, "player eliminated");
            self.cheaters.push(proxy.seat().clone());
            proxy.abort();
        }

        self.broadcast(Notification::PlayerRemoved { color: removed });
        Ok(())
    }

    fn announce_initial_state(&self) {
        for proxy in &self.proxies {
            proxy.notify(Notification::InitialState {
                color: proxy.seat().color,
                state: self.state.clone(),
            });
        }
    }

    /// Queue a notification for every surviving player without waiting
    fn broadcast(&self, notification: Notification) {
        for proxy in &self.proxies {
            proxy.notify(notification.clone());
        }
    }

    fn abort_all(&mut self) {
        for proxy in self.proxies.drain(..) {
            proxy.abort();
        }
    }

    fn proxy(&self, color: PlayerColor) -> Result<&PlayerProxy, GameError> {
        self.proxies
            .iter()
            .find(|p| p.seat().color == color)
            .ok_or(GameError::NoPlayers)
    }
}

// ============================================================================
// TESTS
// ============================================================================
