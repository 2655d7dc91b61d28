//! Play command - referee one match between local minimax agents
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), play_match(), report_results()
//! - Level 3: create_players()
//! - Level 4: command arguments

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hexfish_core::DEFAULT_DEPTH;
use hexfish_referee::{AgentConfig, PlayerHandle, Referee, RefereeConfig, Results, StrategyPlayer};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Number of players (2-4)
    #[arg(long, default_value = "2")]
    pub players: usize,

    /// Minimax search depth, in turns of the searching player
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    pub depth: u32,

    /// Board rows (overrides the config file)
    #[arg(long)]
    pub rows: Option<usize>,

    /// Board columns (overrides the config file)
    #[arg(long)]
    pub cols: Option<usize>,

    /// Board seed (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Per-call player deadline in milliseconds (overrides the config file)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Referee configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Build the referee configuration
/// 2. Play the match
/// 3. Print the results as JSON
pub fn run(args: PlayArgs) -> Result<()> {
    let config = build_config(&args)?;

    tracing::info!(
        "Starting match: {} players on {}x{} (depth={})",
        args.players,
        config.rows,
        config.cols,
        args.depth
    );

    let results = play_match(config, &args)?;

    report_results(&results)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Config file first, then any flags on top
fn build_config(args: &PlayArgs) -> Result<RefereeConfig> {
    let mut config = match &args.config {
        Some(path) => RefereeConfig::load(path)
            .with_context(|| format!("Failed to load referee config: {}", path.display()))?,
        None => RefereeConfig::default(),
    };

    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }

    Ok(config)
}

fn play_match(config: RefereeConfig, args: &PlayArgs) -> Result<Results> {
    let players = create_players(args.players, args.depth);
    let referee = Referee::new(config);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime
        .block_on(referee.run_game(players))
        .context("Match could not be started")
}

fn report_results(results: &Results) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    println!("{}", json);
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn create_players(count: usize, depth: u32) -> Vec<Box<dyn PlayerHandle>> {
    (1..=count)
        .map(|i| {
            Box::new(StrategyPlayer::new(format!("minimax-{}", i), AgentConfig { depth }))
                as Box<dyn PlayerHandle>
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> PlayArgs {
        PlayArgs {
            players: 2,
            depth: 1,
            rows: None,
            cols: None,
            seed: None,
            timeout_ms: None,
            config: None,
        }
    }

    #[test]
    fn test_build_config_defaults() {
        let config = build_config(&args()).unwrap();
        assert_eq!(config, RefereeConfig::default());
    }

    #[test]
    fn test_build_config_flags_override() {
        let config = build_config(&PlayArgs {
            rows: Some(6),
            cols: Some(4),
            seed: Some(12),
            timeout_ms: Some(500),
            ..args()
        })
        .unwrap();
        assert_eq!((config.rows, config.cols), (6, 4));
        assert_eq!(config.seed, Some(12));
        assert_eq!(config.timeout_ms, 500);
    }

    #[test]
    fn test_build_config_missing_file() {
        let result = build_config(&PlayArgs {
            config: Some(PathBuf::from("/nonexistent/referee.json")),
            ..args()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_create_players_names() {
        let players = create_players(3, 2);
        let names: Vec<&str> = players.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["minimax-1", "minimax-2", "minimax-3"]);
    }

    #[test]
    fn test_play_match_rejects_single_player() {
        let config = RefereeConfig::default().with_seed(1);
        let result = play_match(config, &PlayArgs { players: 1, ..args() });
        assert!(result.is_err());
    }
}
