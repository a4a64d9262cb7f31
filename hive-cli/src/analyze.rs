//! Position commands - inspect a single snapshot
//!
//! `moves`, `eval` and `best` all load one position (or start from the empty
//! board) and print what the core reports about it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use hive_core::{
    evaluate, legal_moves, BestResponseAI, Board, BoardSnapshot, EvalWeights, GameConfig,
    SearchConfig,
};

use crate::PositionArgs;

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct MovesArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct EvalArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// Evaluator weights JSON file (built-in table when omitted)
    #[arg(long, value_name = "FILE")]
    pub weights: Option<PathBuf>,
}

#[derive(Args)]
pub struct BestArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// Evaluator weights JSON file (built-in table when omitted)
    #[arg(long, value_name = "FILE")]
    pub weights: Option<PathBuf>,

    /// Search generations
    #[arg(long, default_value = "5")]
    pub depth: u32,

    /// Stop expanding after this many milliseconds
    #[arg(long)]
    pub time_limit_ms: Option<u64>,

    /// Write the snapshot after playing the chosen move
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// COMMANDS
// ============================================================================

pub fn run_moves(args: MovesArgs) -> Result<()> {
    let board = load_board(&args.position)?;
    let moves = legal_moves(&board.snapshot());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&moves)?);
    } else {
        println!("{} to move, {} legal moves", board.player_on_turn(), moves.len());
        for mv in &moves {
            println!("  {}", mv);
        }
    }
    Ok(())
}

pub fn run_eval(args: EvalArgs) -> Result<()> {
    let board = load_board(&args.position)?;
    let weights = load_weights(args.weights.as_deref())?;

    println!("{:.3}", evaluate(&board.snapshot(), &weights));
    Ok(())
}

pub fn run_best(args: BestArgs) -> Result<()> {
    let mut board = load_board(&args.position)?;
    let weights = load_weights(args.weights.as_deref())?;

    let mut config = SearchConfig::with_depth(args.depth);
    if let Some(ms) = args.time_limit_ms {
        config = config.with_time_limit(Duration::from_millis(ms));
    }
    let ai = BestResponseAI::new(config, weights);

    let result = ai.search(&board).context("Search failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "best_move": result.best_move,
            "evaluation": result.evaluation,
            "nodes": result.nodes,
            "generations": result.generations,
        }))?);
    } else {
        match result.best_move {
            Some(mv) => println!("{} (eval {:.3}, {} nodes)", mv, result.evaluation, result.nodes),
            None => println!("no legal move ({})", board.result()),
        }
    }

    if let (Some(path), Some(mv)) = (&args.output, result.best_move) {
        board
            .apply(mv)
            .with_context(|| format!("Engine chose an illegal move: {}", mv))?;
        save_snapshot(&board.snapshot(), path)?;
        tracing::info!("Wrote position after {} to {}", mv, path.display());
    }
    Ok(())
}

// ============================================================================
// LOADING
// ============================================================================

/// Game options from file, or the standard rules
pub fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(p) => GameConfig::load(p)
            .with_context(|| format!("Failed to load game options: {}", p.display())),
        None => Ok(GameConfig::default()),
    }
}

/// Weight table from file, or the built-in one
pub fn load_weights(path: Option<&Path>) -> Result<EvalWeights> {
    match path {
        Some(p) => EvalWeights::load(p)
            .with_context(|| format!("Failed to load evaluator weights: {}", p.display())),
        None => Ok(EvalWeights::default()),
    }
}

/// Board from a snapshot file, or the empty board
pub fn load_board(args: &PositionArgs) -> Result<Board> {
    let config = load_config(args.config.as_deref())?;

    let Some(path) = &args.snapshot else {
        return Ok(Board::new(config));
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    let snapshot: BoardSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;

    Board::from_snapshot(&snapshot, config)
        .with_context(|| format!("Snapshot does not fit the piece bag: {}", path.display()))
}

pub fn save_snapshot(snapshot: &BoardSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
