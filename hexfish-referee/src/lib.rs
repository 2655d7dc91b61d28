//! HEXFISH Referee - Match play between player handles
//!
//! This crate provides match infrastructure:
//! - The player handle contract and two local agents
//! - A referee that enforces rules, deadlines and eliminations
//! - Match results and configuration
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: Referee::run_game (orchestration)
//! - Level 2: placement, movement, finish (phases)
//! - Level 3: player tasks, elimination, broadcast, agents (steps)
//! - Level 4: utilities, configuration, results

mod config;
mod error;
mod player;
mod proxy;
mod referee;
mod results;

pub use config::{AgentConfig, RefereeConfig, DEFAULT_TIMEOUT_MS};
pub use error::RefereeError;
pub use player::{deliver, Notification, NotificationLog, PlayerHandle, ScriptedPlayer, StrategyPlayer};
pub use referee::Referee;
pub use results::{Results, Seat};
